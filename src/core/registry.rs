//! Command table: name → (handler, trigger kind, tier, description).
//!
//! Names are unique across the whole table regardless of trigger kind. Besides the
//! primary map, the table keeps one list of names per trigger kind in registration order,
//! which is the order MATCH and CONTAIN resolution scans them in.

use crate::core::command::BotCommand;
use crate::errors::Error;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// How a command is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// Explicit `{prefix}{name} args` syntax
    Prefix,
    /// The whole message equals the name
    Match,
    /// The name appears anywhere in the message
    Contain,
}

impl TriggerKind {
    /// Storage form of the trigger kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prefix => "prefix",
            Self::Match => "match",
            Self::Contain => "contain",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prefix" => Ok(Self::Prefix),
            "match" => Ok(Self::Match),
            "contain" => Ok(Self::Contain),
            other => Err(Error::InvalidTriggerKind {
                value: other.to_string(),
            }),
        }
    }
}

/// One registered command.
#[derive(Clone)]
pub struct CommandEntry {
    /// Lower-cased name
    pub name: String,
    /// Handler invoked on dispatch
    pub handler: Arc<dyn BotCommand>,
    /// Trigger kind
    pub trigger: TriggerKind,
    /// Minimum tier
    pub tier: i32,
    /// Help text
    pub description: String,
}

impl fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry")
            .field("name", &self.name)
            .field("trigger", &self.trigger)
            .field("tier", &self.tier)
            .finish_non_exhaustive()
    }
}

/// The in-memory command table.
#[derive(Default)]
pub struct CommandTable {
    entries: HashMap<String, CommandEntry>,
    prefix: Vec<String>,
    matches: Vec<String>,
    contains: Vec<String>,
}

impl CommandTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn list_mut(&mut self, kind: TriggerKind) -> &mut Vec<String> {
        match kind {
            TriggerKind::Prefix => &mut self.prefix,
            TriggerKind::Match => &mut self.matches,
            TriggerKind::Contain => &mut self.contains,
        }
    }

    /// Names registered under one trigger kind, in registration order.
    #[must_use]
    pub fn names(&self, kind: TriggerKind) -> &[String] {
        match kind {
            TriggerKind::Prefix => &self.prefix,
            TriggerKind::Match => &self.matches,
            TriggerKind::Contain => &self.contains,
        }
    }

    /// Registers a command, replacing any entry with the same (case-insensitive) name.
    ///
    /// Returns the replaced entry, if any.
    pub fn register(
        &mut self,
        name: &str,
        handler: Arc<dyn BotCommand>,
        trigger: TriggerKind,
        tier: i32,
        description: impl Into<String>,
    ) -> Option<CommandEntry> {
        let key = name.to_lowercase();
        let previous = self.entries.remove(&key);
        if let Some(old) = &previous {
            if old.trigger != trigger {
                self.list_mut(old.trigger).retain(|n| n != &key);
            }
        }

        let list = self.list_mut(trigger);
        if !list.contains(&key) {
            list.push(key.clone());
        }

        self.entries.insert(
            key.clone(),
            CommandEntry {
                name: key,
                handler,
                trigger,
                tier,
                description: description.into(),
            },
        );
        previous
    }

    /// Removes a command by name.
    ///
    /// # Errors
    /// Returns [`Error::CommandNotFound`] if no such command is registered.
    pub fn unregister(&mut self, name: &str) -> Result<CommandEntry, Error> {
        let key = name.to_lowercase();
        let entry = self
            .entries
            .remove(&key)
            .ok_or(Error::CommandNotFound { name: key.clone() })?;
        self.list_mut(entry.trigger).retain(|n| n != &key);
        Ok(entry)
    }

    /// Empties the table.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.prefix.clear();
        self.matches.clear();
        self.contains.clear();
    }

    /// Looks a command up by name, case-insensitively.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&CommandEntry> {
        self.entries.get(&name.to_lowercase())
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// PREFIX command with the given name.
    #[must_use]
    pub fn find_prefix(&self, name: &str) -> Option<&CommandEntry> {
        self.lookup(name).filter(|e| e.trigger == TriggerKind::Prefix)
    }

    /// First MATCH command (registration order) equal to the normalized text.
    #[must_use]
    pub fn find_match(&self, normalized: &str) -> Option<&CommandEntry> {
        self.matches
            .iter()
            .find(|name| name.as_str() == normalized)
            .and_then(|name| self.entries.get(name))
    }

    /// First CONTAIN command (registration order) that is a substring of the normalized text.
    #[must_use]
    pub fn find_contain(&self, normalized: &str) -> Option<&CommandEntry> {
        self.contains
            .iter()
            .find(|name| normalized.contains(name.as_str()))
            .and_then(|name| self.entries.get(name))
    }

    /// Commands runnable at `tier`, sorted by trigger kind then name.
    #[must_use]
    pub fn visible_to(&self, tier: i32) -> Vec<&CommandEntry> {
        let mut visible: Vec<&CommandEntry> =
            self.entries.values().filter(|e| e.tier <= tier).collect();
        visible.sort_by(|a, b| {
            (a.trigger.as_str(), a.name.as_str()).cmp(&(b.trigger.as_str(), b.name.as_str()))
        });
        visible
    }
}
