//! General slash commands - ping and the command list.
//!
//! Everything else the bot does is driven by plain text messages routed through the
//! dispatcher; these two exist so the bot is discoverable from Discord's command picker.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, commands::help},
        errors::Result,
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command)]
    pub async fn ping(ctx: Context<'_>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Lists the text commands you are allowed to use.
    ///
    /// The list depends on your permission tier, so it is only shown to you.
    #[poise::command(slash_command)]
    pub async fn commands(ctx: Context<'_>) -> Result<()> {
        let session = &ctx.data().session;
        let tier = session.tier_of(ctx.author().id.get()).await;
        let listing = {
            let table = session.commands().await;
            help::render_command_list(&table.visible_to(tier), &session.settings().prefix)
        };
        let text = if listing.is_empty() {
            "No commands are available to you.".to_string()
        } else {
            format!("**Commands for tier {tier}**\n{listing}")
        };
        ctx.send(poise::CreateReply::default().content(text).ephemeral(true))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
