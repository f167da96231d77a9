//! Bot session - the one owner of all mutable bot state.
//!
//! The session holds the command table, rate limiter, query history, selection hub and
//! per-user execution locks, and is passed by reference to the dispatcher and every
//! handler. Separate sessions share nothing, which keeps tests isolated.

use crate::{
    config::BotSettings,
    core::{
        catalog,
        choice::{self, ChoiceOutcome, SelectionHub},
        command::{CommandContext, CommandSpec, HandlerCatalog},
        command_store,
        history::{QueryHistory, QueryKind, UserQuery},
        messaging::{ChannelId, MessageId, Messenger, OutgoingMessage, UserId},
        permissions,
        rate_limit::{RateLimiter, SentRecord, Suppression},
        registry::CommandTable,
        resolver::{Candidate, EntityClass},
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock, RwLockReadGuard};
use tracing::{debug, info, instrument, warn};

/// Result of a gated send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The message was sent
    Sent(MessageId),
    /// A cooldown suppressed the message; nothing was sent
    Suppressed(Suppression),
}

/// Shared state of one running bot.
pub struct Session {
    settings: BotSettings,
    db: DatabaseConnection,
    messenger: Arc<dyn Messenger>,
    catalog: HandlerCatalog,
    commands: RwLock<CommandTable>,
    limiter: Mutex<RateLimiter>,
    queries: Mutex<QueryHistory>,
    selections: SelectionHub,
    user_locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
    choice_timeout: Duration,
}

impl Session {
    /// Creates a session with an empty command table; call
    /// [`refresh_commands`](Self::refresh_commands) to load it.
    ///
    /// # Errors
    /// Returns a configuration error if the settings are invalid.
    pub fn new(
        settings: BotSettings,
        db: DatabaseConnection,
        messenger: Arc<dyn Messenger>,
        catalog: HandlerCatalog,
    ) -> Result<Self> {
        settings.validate()?;
        let limiter = RateLimiter::from_settings(&settings.cooldown)?;
        let choice_timeout = settings.choice.timeout()?;
        let queries = QueryHistory::new(settings.lookup.query_history_size);

        Ok(Self {
            settings,
            db,
            messenger,
            catalog,
            commands: RwLock::new(CommandTable::new()),
            limiter: Mutex::new(limiter),
            queries: Mutex::new(queries),
            selections: SelectionHub::new(),
            user_locks: Mutex::new(HashMap::new()),
            choice_timeout,
        })
    }

    /// Bot settings.
    #[must_use]
    pub const fn settings(&self) -> &BotSettings {
        &self.settings
    }

    /// Database connection.
    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Hub the transport publishes selection events to.
    #[must_use]
    pub const fn selections(&self) -> &SelectionHub {
        &self.selections
    }

    /// Read access to the command table.
    pub async fn commands(&self) -> RwLockReadGuard<'_, CommandTable> {
        self.commands.read().await
    }

    /// Rebuilds the command table from the `bot_commands` table and swaps it in at once.
    ///
    /// Returns the number of commands registered.
    #[instrument(skip(self))]
    pub async fn refresh_commands(&self) -> Result<usize> {
        let rows = command_store::load_commands(&self.db).await?;
        let table = self.catalog.build_table(&rows);
        let count = table.len();
        *self.commands.write().await = table;
        info!("Command table refreshed with {} commands", count);
        Ok(count)
    }

    /// Persists a command and registers it in the live table.
    ///
    /// # Errors
    /// Returns [`Error::HandlerNotFound`] if the handler reference is unknown, or the
    /// validation errors of [`command_store::save_command`].
    pub async fn add_command(&self, spec: &CommandSpec) -> Result<()> {
        let handler = self.catalog.get(spec.handler.trim())?;
        let row = command_store::save_command(&self.db, spec).await?;
        self.commands
            .write()
            .await
            .register(&row.name, handler, spec.trigger, row.tier, row.description);
        info!(command = %spec.name, trigger = %spec.trigger, tier = spec.tier, "Command added");
        Ok(())
    }

    /// Removes a command from storage and the live table.
    ///
    /// # Errors
    /// Returns [`Error::CommandNotFound`] if it was in neither.
    pub async fn remove_command(&self, name: &str) -> Result<()> {
        let stored = command_store::delete_command(&self.db, name).await?;
        let live = self.commands.write().await.unregister(name).is_ok();
        if !stored && !live {
            return Err(Error::CommandNotFound {
                name: name.to_lowercase(),
            });
        }
        info!(command = %name, "Command removed");
        Ok(())
    }

    /// Tier of a user, falling back to the default tier for unknown users.
    pub async fn tier_of(&self, user: UserId) -> i32 {
        match permissions::get_tier(&self.db, user).await {
            Ok(Some(tier)) => tier,
            Ok(None) => self.settings.default_tier,
            Err(e) => {
                warn!(user, "Failed to read tier, using default: {}", e);
                self.settings.default_tier
            }
        }
    }

    /// Sends a message unless a cooldown suppresses it.
    ///
    /// The cooldown check and the timestamp update happen under one lock, so two
    /// concurrent replies can never both pass the same window.
    pub async fn send(
        &self,
        channel: ChannelId,
        user: UserId,
        tier: i32,
        message: &OutgoingMessage,
    ) -> Result<Delivery> {
        let admitted = self
            .limiter
            .lock()
            .await
            .acquire(channel, user, tier, Instant::now());
        if let Err(reason) = admitted {
            info!(channel, user, %reason, "Reply suppressed");
            return Ok(Delivery::Suppressed(reason));
        }

        let message_id = self.messenger.send(channel, message).await?;
        let summary = message.summary();
        debug!(channel, user, message_id, %summary, "Reply sent");
        self.limiter.lock().await.record_sent(
            user,
            SentRecord {
                channel_id: channel,
                message_id,
                summary,
                sent_at: Utc::now(),
            },
        );
        Ok(Delivery::Sent(message_id))
    }

    /// Messages recently delivered for a user, oldest first.
    pub async fn sent_history(&self, user: UserId) -> Vec<SentRecord> {
        self.limiter.lock().await.sent_history(user)
    }

    /// Runs one choice session for the invoking user.
    ///
    /// The prompt is part of an interaction that was already admitted, so it is sent
    /// directly rather than through the cooldown gate.
    pub async fn choose(&self, ctx: &CommandContext<'_>, header: &str, labels: &[String]) -> Result<ChoiceOutcome> {
        let count = choice::capped_len(labels.len(), self.settings.choice.max_choices);
        if count == 0 {
            return Ok(ChoiceOutcome::Cancelled);
        }
        let channel = ctx.invocation.channel_id;
        let user = ctx.invocation.user_id;

        // Subscribe before the prompt exists so no early selection is missed
        let mut events = self.selections.subscribe();
        let prompt = OutgoingMessage::text(choice::render_prompt(header, &labels[..count]));
        let prompt_id = self.messenger.send(channel, &prompt).await?;

        if let Err(e) = self
            .messenger
            .add_markers(channel, prompt_id, &choice::markers_for(count))
            .await
        {
            warn!(prompt_id, "Failed to attach choice markers: {}", e);
        }

        let outcome =
            choice::await_selection(&mut events, prompt_id, user, count, self.choice_timeout).await;
        debug!(prompt_id, user, ?outcome, "Choice finished");

        if let Err(e) = self.messenger.clear_markers(channel, prompt_id).await {
            debug!(prompt_id, "Ignoring marker cleanup failure: {}", e);
        }
        Ok(outcome)
    }

    /// Resolves a free-text name against an entity class.
    ///
    /// Exact alias or canonical matches return at once. Otherwise, with suggestions
    /// enabled, the user is offered the closest names; with none close enough, the user is
    /// told the name is not recognized.
    pub async fn resolve_name(
        &self,
        ctx: &CommandContext<'_>,
        query: &str,
        class: EntityClass,
        suggest: bool,
    ) -> Result<Option<String>> {
        let tables = catalog::load_lookup_tables(&self.db, class).await?;
        if let Some(name) = tables.resolve_exact(query) {
            return Ok(Some(name));
        }
        if !suggest {
            return Ok(None);
        }

        let lookup = &self.settings.lookup;
        let candidates = tables.suggestions(query, lookup.cutoff, lookup.max_suggestions);
        if candidates.is_empty() {
            ctx.say(OutgoingMessage::text(format!(
                "`{}` is not a recognized {class} name.",
                query.trim()
            )))
            .await?;
            return Ok(None);
        }

        let labels: Vec<String> = candidates.iter().map(Candidate::label).collect();
        let header = format!("`{}` is not a recognized {class} name. Did you mean:", query.trim());
        let outcome = self.choose(ctx, &header, &labels).await?;
        Ok(outcome
            .selected()
            .and_then(|index| candidates.get(index))
            .map(|c| c.target.clone()))
    }

    /// Records a query in a user's history.
    pub async fn remember_query(&self, user: UserId, query: UserQuery) {
        self.queries.lock().await.push(user, query);
    }

    /// Most recent query of `kind` made by a user.
    pub async fn last_query(&self, user: UserId, kind: QueryKind) -> Option<UserQuery> {
        self.queries.lock().await.last_of(user, kind).cloned()
    }

    /// Execution lock of a user; handlers for one user run one at a time.
    ///
    /// Hand the lock back through [`release_user_lock`](Self::release_user_lock) once the
    /// handler is done.
    pub async fn user_lock(&self, user: UserId) -> Arc<Mutex<()>> {
        Arc::clone(self.user_locks.lock().await.entry(user).or_default())
    }

    /// Returns a user's execution lock, dropping its map entry when nobody else holds it.
    pub async fn release_user_lock(&self, user: UserId, lock: Arc<Mutex<()>>) {
        let mut locks = self.user_locks.lock().await;
        drop(lock);
        // Clones are only handed out under the map lock, so this count cannot grow here
        if locks.get(&user).is_some_and(|held| Arc::strong_count(held) == 1) {
            locks.remove(&user);
        }
    }

    /// Number of users with a live execution lock.
    pub async fn user_lock_count(&self) -> usize {
        self.user_locks.lock().await.len()
    }
}
