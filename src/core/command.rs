//! Handler capability, handler catalog and the context handlers run with.
//!
//! Handlers are plain values implementing [`BotCommand`]. They are registered by direct
//! reference in a [`HandlerCatalog`] under a stable handler reference; persisted command
//! rows name that reference, and [`HandlerCatalog::build_table`] binds the two.

use crate::{
    core::{
        choice::ChoiceOutcome,
        command_store,
        history::{QueryKind, UserQuery},
        messaging::OutgoingMessage,
        parser::Invocation,
        registry::{CommandTable, TriggerKind},
        resolver::EntityClass,
        session::{Delivery, Session},
    },
    entities::bot_command,
    errors::{Error, Result},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// What a handler produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Send this payload through the rate-limited gate
    Reply(OutgoingMessage),
    /// Record this line in the audit log; nothing is sent
    Log(String),
    /// Nothing further to do (the handler already replied, or chose not to)
    Silent,
}

impl CommandOutput {
    /// A plain text reply.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Reply(OutgoingMessage::text(content))
    }
}

/// A command handler.
#[async_trait]
pub trait BotCommand: Send + Sync {
    /// Runs the command for one invocation.
    async fn run(&self, ctx: &CommandContext<'_>) -> Result<CommandOutput>;
}

/// Everything a handler may touch while it runs.
pub struct CommandContext<'a> {
    /// The owning session
    pub session: &'a Session,
    /// The parsed message
    pub invocation: &'a Invocation,
    /// Invoking user's tier
    pub tier: i32,
}

impl CommandContext<'_> {
    /// Sends a message to the invoking channel through the rate-limited gate.
    pub async fn say(&self, message: OutgoingMessage) -> Result<Delivery> {
        self.session
            .send(
                self.invocation.channel_id,
                self.invocation.user_id,
                self.tier,
                &message,
            )
            .await
    }

    /// Resolves a free-text name, prompting the user to pick among suggestions if enabled.
    pub async fn resolve(&self, query: &str, class: EntityClass, suggest: bool) -> Result<Option<String>> {
        self.session.resolve_name(self, query, class, suggest).await
    }

    /// Asks the invoking user to pick one of `labels`.
    pub async fn choose(&self, header: &str, labels: &[String]) -> Result<ChoiceOutcome> {
        self.session.choose(self, header, labels).await
    }

    /// Records a query in the user's history.
    pub async fn remember(&self, query: UserQuery) {
        self.session
            .remember_query(self.invocation.user_id, query)
            .await;
    }

    /// Most recent query of `kind` made by the invoking user.
    pub async fn last_query(&self, kind: QueryKind) -> Option<UserQuery> {
        self.session
            .last_query(self.invocation.user_id, kind)
            .await
    }
}

/// A command row to persist: name, handler reference, trigger, tier, description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Command name or trigger text
    pub name: String,
    /// Handler reference in the catalog
    pub handler: String,
    /// Trigger kind
    pub trigger: TriggerKind,
    /// Minimum tier
    pub tier: i32,
    /// Help text
    pub description: String,
}

impl CommandSpec {
    /// Creates a spec.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        handler: impl Into<String>,
        trigger: TriggerKind,
        tier: i32,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            handler: handler.into(),
            trigger,
            tier,
            description: description.into(),
        }
    }
}

/// Handlers known to the process, keyed by handler reference.
#[derive(Default, Clone)]
pub struct HandlerCatalog {
    handlers: HashMap<String, Arc<dyn BotCommand>>,
    defaults: Vec<CommandSpec>,
}

impl HandlerCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under a reference.
    pub fn insert(&mut self, reference: impl Into<String>, handler: Arc<dyn BotCommand>) {
        self.handlers.insert(reference.into(), handler);
    }

    /// Registers a handler together with the command row seeded for it by default.
    pub fn insert_default(&mut self, spec: CommandSpec, handler: Arc<dyn BotCommand>) {
        self.insert(spec.handler.clone(), handler);
        self.defaults.push(spec);
    }

    /// Handler registered under `reference`.
    ///
    /// # Errors
    /// Returns [`Error::HandlerNotFound`] for unknown references.
    pub fn get(&self, reference: &str) -> Result<Arc<dyn BotCommand>> {
        self.handlers
            .get(reference)
            .cloned()
            .ok_or_else(|| Error::HandlerNotFound {
                handler: reference.to_string(),
            })
    }

    /// Command rows seeded into an empty database.
    #[must_use]
    pub fn defaults(&self) -> &[CommandSpec] {
        &self.defaults
    }

    /// Builds a complete command table from persisted rows, in row order.
    ///
    /// Rows with an unknown handler reference or trigger kind are skipped with a warning.
    #[must_use]
    pub fn build_table(&self, rows: &[bot_command::Model]) -> CommandTable {
        let mut table = CommandTable::new();
        for row in rows {
            let bound = command_store::trigger_of(row)
                .and_then(|trigger| Ok((trigger, self.get(&row.handler)?)));
            match bound {
                Ok((trigger, handler)) => {
                    table.register(&row.name, handler, trigger, row.tier, row.description.clone());
                }
                Err(e) => warn!(command = %row.name, "Skipping command: {}", e),
            }
        }
        table
    }
}
