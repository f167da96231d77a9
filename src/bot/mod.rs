//! Bot layer - Discord-specific interface and command handlers
//!
//! This module binds the routing core to Discord: gateway events are converted and handed
//! to the dispatcher, replies go out through [`messenger::DiscordMessenger`], and the
//! built-in text command handlers live in [`commands`].

/// Built-in text command handlers and the slash commands
pub mod commands;
/// Gateway event routing (messages and reactions)
pub mod events;
/// Discord implementation of the messenger seam
pub mod messenger;

use crate::{
    config::BotSettings,
    core::{command::HandlerCatalog, messaging::Messenger, session::Session},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands and event handlers.
pub struct BotData {
    /// The session every message is dispatched against
    pub session: Arc<Session>,
}

impl BotData {
    /// Wraps a session for the framework.
    #[must_use]
    pub const fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

/// Poise context type used by the slash commands.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("An error occurred: {error}")).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Connects to Discord and runs until the client stops.
#[instrument(skip_all)]
pub async fn run_bot(
    token: String,
    settings: BotSettings,
    db: DatabaseConnection,
    catalog: HandlerCatalog,
) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![commands::ping(), commands::commands()],
            on_error: |error| Box::pin(on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::handle_event(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                let messenger: Arc<dyn Messenger> =
                    Arc::new(messenger::DiscordMessenger::new(Arc::clone(&ctx.http)));
                let session = Session::new(settings, db, messenger, catalog)?;
                session.refresh_commands().await?;

                info!("Registering slash commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(Arc::new(session)))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS
        | serenity::GatewayIntents::DIRECT_MESSAGE_REACTIONS;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}
