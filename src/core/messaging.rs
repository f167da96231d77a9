//! Transport-neutral message types and the outbound [`Messenger`] seam.
//!
//! The routing core never talks to Discord directly. Inbound events are converted into
//! [`InboundMessage`] by the bot layer, and every outbound action goes through a
//! [`Messenger`] implementation.

use crate::errors::Result;
use async_trait::async_trait;

/// Chat user id.
pub type UserId = u64;
/// Chat channel id.
pub type ChannelId = u64;
/// Id of a message the bot has sent.
pub type MessageId = u64;

/// One incoming text message.
#[derive(Debug, Clone, Default)]
pub struct InboundMessage {
    /// Sender of the message
    pub author_id: UserId,
    /// Whether the sender is an automated account
    pub author_is_bot: bool,
    /// Channel the message was posted in
    pub channel_id: ChannelId,
    /// Server the channel belongs to, `None` for direct messages
    pub guild_id: Option<u64>,
    /// Raw message text
    pub content: String,
    /// Users explicitly mentioned in the message
    pub mentions: Vec<UserId>,
}

/// A rich embed, converted to the platform's embed type by the messenger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Embed {
    /// Embed title
    pub title: String,
    /// Body text
    pub description: Option<String>,
    /// `(name, value, inline)` fields in display order
    pub fields: Vec<(String, String, bool)>,
    /// Accent colour as `0xRRGGBB`
    pub color: Option<u32>,
    /// Footer text
    pub footer: Option<String>,
}

impl Embed {
    /// Creates an embed with only a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the body text.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends an inline field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push((name.into(), value.to_string(), true));
        self
    }

    /// Sets the accent colour.
    #[must_use]
    pub const fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    /// Sets the footer text.
    #[must_use]
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

/// A reply payload: plain text, an embed, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Plain text content
    pub content: Option<String>,
    /// Structured payload
    pub embed: Option<Embed>,
}

impl OutgoingMessage {
    /// A text-only message.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            embed: None,
        }
    }

    /// An embed-only message.
    #[must_use]
    pub const fn embed(embed: Embed) -> Self {
        Self {
            content: None,
            embed: Some(embed),
        }
    }

    /// Short one-line summary used in logs and the sent-message history.
    #[must_use]
    pub fn summary(&self) -> String {
        match (&self.content, &self.embed) {
            (Some(text), _) => text.lines().next().unwrap_or_default().to_string(),
            (None, Some(embed)) => format!("[embed] {}", embed.title),
            (None, None) => String::new(),
        }
    }
}

/// Outbound chat primitives.
///
/// `send` is only ever called through the session's rate-limited gate.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends a message to a channel and returns its id.
    async fn send(&self, channel: ChannelId, message: &OutgoingMessage) -> Result<MessageId>;

    /// Attaches selectable markers to a sent message, in order.
    async fn add_markers(&self, channel: ChannelId, message: MessageId, markers: &[&str]) -> Result<()>;

    /// Removes all markers from a sent message.
    async fn clear_markers(&self, channel: ChannelId, message: MessageId) -> Result<()>;
}
