//! Discord implementation of [`Messenger`] over the serenity HTTP client.

use crate::{
    core::messaging::{ChannelId, Embed, MessageId, Messenger, OutgoingMessage},
    errors::Result,
};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::debug;

/// Sends through Discord's REST API.
pub struct DiscordMessenger {
    http: Arc<serenity::Http>,
}

impl DiscordMessenger {
    /// Creates a messenger sharing the client's HTTP handle.
    #[must_use]
    pub const fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

fn to_serenity_embed(embed: &Embed) -> serenity::CreateEmbed {
    let mut out = serenity::CreateEmbed::new().title(&embed.title);
    if let Some(description) = &embed.description {
        out = out.description(description);
    }
    for (name, value, inline) in &embed.fields {
        out = out.field(name, value, *inline);
    }
    if let Some(color) = embed.color {
        out = out.color(color);
    }
    if let Some(footer) = &embed.footer {
        out = out.footer(serenity::CreateEmbedFooter::new(footer));
    }
    out
}

fn to_create_message(message: &OutgoingMessage) -> serenity::CreateMessage {
    let mut builder = serenity::CreateMessage::new();
    if let Some(content) = &message.content {
        builder = builder.content(content);
    }
    if let Some(embed) = &message.embed {
        builder = builder.embed(to_serenity_embed(embed));
    }
    builder
}

#[async_trait]
impl Messenger for DiscordMessenger {
    async fn send(&self, channel: ChannelId, message: &OutgoingMessage) -> Result<MessageId> {
        let sent = serenity::ChannelId::new(channel)
            .send_message(&*self.http, to_create_message(message))
            .await?;
        Ok(sent.id.get())
    }

    async fn add_markers(&self, channel: ChannelId, message: MessageId, markers: &[&str]) -> Result<()> {
        let channel = serenity::ChannelId::new(channel);
        let message = serenity::MessageId::new(message);
        // Discord shows reactions in the order they were added
        for marker in markers {
            let reaction = serenity::ReactionType::Unicode((*marker).to_string());
            self.http.create_reaction(channel, message, &reaction).await?;
        }
        debug!(%message, count = markers.len(), "Markers attached");
        Ok(())
    }

    async fn clear_markers(&self, channel: ChannelId, message: MessageId) -> Result<()> {
        self.http
            .delete_message_reactions(serenity::ChannelId::new(channel), serenity::MessageId::new(message))
            .await?;
        Ok(())
    }
}
