//! `help` - lists the commands the caller may run.

use crate::{
    core::{
        command::{BotCommand, CommandContext, CommandOutput},
        messaging::{Embed, OutgoingMessage},
        registry::{CommandEntry, TriggerKind},
    },
    errors::Result,
};
use async_trait::async_trait;
use std::fmt::Write;

/// One line per command: how to trigger it and what it does.
#[must_use]
pub fn render_command_list(entries: &[&CommandEntry], prefix: &str) -> String {
    let mut text = String::new();
    for entry in entries {
        let trigger = match entry.trigger {
            TriggerKind::Prefix => format!("`{prefix}{}`", entry.name),
            TriggerKind::Match => format!("\"{}\"", entry.name),
            TriggerKind::Contain => format!("...{}...", entry.name),
        };
        let _ = write!(text, "• {trigger}");
        if !entry.description.is_empty() {
            let _ = write!(text, " - {}", entry.description);
        }
        text.push('\n');
    }
    text
}

/// Lists the commands visible at the caller's tier.
pub struct Help;

#[async_trait]
impl BotCommand for Help {
    async fn run(&self, ctx: &CommandContext<'_>) -> Result<CommandOutput> {
        let listing = {
            let table = ctx.session.commands().await;
            render_command_list(&table.visible_to(ctx.tier), &ctx.session.settings().prefix)
        };
        let embed = Embed::new("Available commands")
            .description(listing)
            .footer(format!(
                "Tier {} | separate arguments with \"{}\"",
                ctx.tier,
                ctx.session.settings().delimiter
            ));
        Ok(CommandOutput::Reply(OutgoingMessage::embed(embed)))
    }
}
