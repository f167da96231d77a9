//! Conversational triggers: `good bot` and the table flip.

use crate::{
    core::command::{BotCommand, CommandContext, CommandOutput},
    errors::Result,
};
use async_trait::async_trait;

/// Reply to being called a good bot.
pub const THANKS: &str = "Thank you! (◕‿◕✿)";
/// Reply to a flipped table.
pub const UNFLIP: &str = "┬─┬ノ( º _ ºノ) Please respect the tables.";

/// Thanks whoever praised the bot.
pub struct GoodBot;

#[async_trait]
impl BotCommand for GoodBot {
    async fn run(&self, _ctx: &CommandContext<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::text(THANKS))
    }
}

/// Puts a flipped table back.
pub struct TableFlip;

#[async_trait]
impl BotCommand for TableFlip {
    async fn run(&self, _ctx: &CommandContext<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::text(UNFLIP))
    }
}
