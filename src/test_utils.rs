//! Shared test utilities for `shuffle-buddy`.
//!
//! This module provides an in-memory database, game data fixtures, a recording
//! [`Messenger`] and a recording [`BotCommand`] so routing can be tested without Discord.

#![allow(clippy::unwrap_used)]

use crate::{
    config::BotSettings,
    core::{
        choice::{MARKERS, SelectionEvent, SelectionHub},
        command::{BotCommand, CommandContext, CommandOutput, HandlerCatalog},
        messaging::{ChannelId, InboundMessage, MessageId, Messenger, OutgoingMessage, UserId},
        parser::Invocation,
        session::Session,
    },
    entities::{pokemon, skill, stage},
    errors::{Error, Result},
};
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all database tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Installs a `trace` level subscriber that writes through the test harness.
/// Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("trace")
        .with_test_writer()
        .try_init();
}

/// Creates a test Pokémon with sensible defaults.
///
/// # Defaults
/// * kind: "Normal"
/// * `base_power`: 50
/// * skill: "Opportunist"
pub async fn create_test_pokemon(db: &DatabaseConnection, name: &str) -> Result<pokemon::Model> {
    Ok(pokemon::ActiveModel {
        name: Set(name.to_string()),
        kind: Set("Normal".to_string()),
        base_power: Set(50),
        skill: Set("Opportunist".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

/// Creates a test skill with a generic description.
pub async fn create_test_skill(db: &DatabaseConnection, name: &str) -> Result<skill::Model> {
    Ok(skill::ActiveModel {
        name: Set(name.to_string()),
        description: Set(format!("{name} does something useful")),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

/// Creates a test stage featuring `pokemon`, with 1000 HP and 10 moves.
pub async fn create_test_stage(db: &DatabaseConnection, index: i32, pokemon: &str) -> Result<stage::Model> {
    Ok(stage::ActiveModel {
        stage_index: Set(index),
        pokemon: Set(pokemon.to_string()),
        hp: Set(1000),
        moves: Set(10),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

/// Settings with every cooldown disabled and unknown users at tier 1.
#[must_use]
pub fn test_settings() -> BotSettings {
    let mut settings = BotSettings::default();
    settings.default_tier = 1;
    settings.cooldown.channel_secs = 0.0;
    settings.cooldown.user_secs.clear();
    settings
}

/// A plain user message in a guild channel.
#[must_use]
pub fn user_message(author: UserId, channel: ChannelId, content: &str) -> InboundMessage {
    InboundMessage {
        author_id: author,
        channel_id: channel,
        guild_id: Some(1),
        content: content.to_string(),
        ..InboundMessage::default()
    }
}

/// Builds a session over a fresh in-memory database and a [`RecordingMessenger`].
pub async fn test_session(
    catalog: HandlerCatalog,
    settings: BotSettings,
) -> Result<(Arc<Session>, Arc<RecordingMessenger>)> {
    let db = setup_test_db().await?;
    let messenger = Arc::new(RecordingMessenger::default());
    let session = Session::new(settings, db, Arc::clone(&messenger) as Arc<dyn Messenger>, catalog)?;
    Ok((Arc::new(session), messenger))
}

#[derive(Default)]
struct Recorded {
    sent: Vec<(ChannelId, OutgoingMessage)>,
    markers: Vec<(MessageId, Vec<String>)>,
    cleared: Vec<MessageId>,
    auto_select: Option<(SelectionHub, UserId, usize)>,
}

/// A [`Messenger`] that records everything and never fails.
#[derive(Default)]
pub struct RecordingMessenger {
    next_id: AtomicU64,
    recorded: Mutex<Recorded>,
}

impl RecordingMessenger {
    /// Everything sent, in order.
    pub fn sent(&self) -> Vec<(ChannelId, OutgoingMessage)> {
        self.recorded.lock().unwrap().sent.clone()
    }

    /// Text of everything sent; embeds are reported by their summary.
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .map(|(_, m)| m.content.clone().unwrap_or_else(|| m.summary()))
            .collect()
    }

    /// Embeds sent, in order.
    pub fn sent_embeds(&self) -> Vec<crate::core::messaging::Embed> {
        self.sent().into_iter().filter_map(|(_, m)| m.embed).collect()
    }

    /// Markers attached per message.
    pub fn markers(&self) -> Vec<(MessageId, Vec<String>)> {
        self.recorded.lock().unwrap().markers.clone()
    }

    /// Messages whose markers were cleared.
    pub fn cleared(&self) -> Vec<MessageId> {
        self.recorded.lock().unwrap().cleared.clone()
    }

    /// Makes `user` pick the marker at `position` on every prompt as soon as its
    /// markers are attached.
    pub fn select_on_prompt(&self, hub: SelectionHub, user: UserId, position: usize) {
        self.recorded.lock().unwrap().auto_select = Some((hub, user, position));
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, channel: ChannelId, message: &OutgoingMessage) -> Result<MessageId> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 100;
        self.recorded
            .lock()
            .unwrap()
            .sent
            .push((channel, message.clone()));
        Ok(id)
    }

    async fn add_markers(&self, _channel: ChannelId, message: MessageId, markers: &[&str]) -> Result<()> {
        let auto_select = {
            let mut recorded = self.recorded.lock().unwrap();
            recorded
                .markers
                .push((message, markers.iter().map(ToString::to_string).collect()));
            recorded.auto_select.clone()
        };
        if let Some((hub, user, position)) = auto_select {
            hub.publish(SelectionEvent {
                message_id: message,
                user_id: user,
                marker: MARKERS[position].to_string(),
            });
        }
        Ok(())
    }

    async fn clear_markers(&self, _channel: ChannelId, message: MessageId) -> Result<()> {
        self.recorded.lock().unwrap().cleared.push(message);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
enum Behaviour {
    #[default]
    Silent,
    Reply(String),
    Log(String),
    Fail,
}

/// A [`BotCommand`] that records every invocation it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingHandler {
    calls: Arc<Mutex<Vec<Invocation>>>,
    behaviour: Behaviour,
}

impl RecordingHandler {
    /// Replies with `text`.
    #[must_use]
    pub fn replying(text: &str) -> Self {
        Self {
            behaviour: Behaviour::Reply(text.to_string()),
            ..Self::default()
        }
    }

    /// Returns a log-only output.
    #[must_use]
    pub fn logging(line: &str) -> Self {
        Self {
            behaviour: Behaviour::Log(line.to_string()),
            ..Self::default()
        }
    }

    /// Fails with an invalid argument error reading "boom".
    #[must_use]
    pub fn failing() -> Self {
        Self {
            behaviour: Behaviour::Fail,
            ..Self::default()
        }
    }

    /// Invocations received so far.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BotCommand for RecordingHandler {
    async fn run(&self, ctx: &CommandContext<'_>) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(ctx.invocation.clone());
        match &self.behaviour {
            Behaviour::Silent => Ok(CommandOutput::Silent),
            Behaviour::Reply(text) => Ok(CommandOutput::text(text.clone())),
            Behaviour::Log(line) => Ok(CommandOutput::Log(line.clone())),
            Behaviour::Fail => Err(Error::InvalidArgument {
                message: "boom".to_string(),
            }),
        }
    }
}
