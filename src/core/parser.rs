//! Message parser - turns one line of chat text into an [`Invocation`].
//!
//! Parsing never fails. Anything that is not a `key=value` token is kept as literal
//! positional text, and a message without the prefix yields an invocation with an empty
//! command name so it can still be matched by MATCH and CONTAIN commands.

use crate::core::messaging::{ChannelId, InboundMessage, UserId};
use std::collections::HashMap;

/// A parsed message, consumed once by the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Text exactly as received
    pub raw_text: String,
    /// Lower-cased command name, empty when the text had no prefix
    pub command_name: String,
    /// Positional arguments in order
    pub args: Vec<String>,
    /// Keyword arguments
    pub kwargs: HashMap<String, String>,
    /// Sender
    pub user_id: UserId,
    /// Channel the message arrived in
    pub channel_id: ChannelId,
    /// Server, if any
    pub guild_id: Option<u64>,
    /// Explicitly mentioned users
    pub mentions: Vec<UserId>,
    /// Whether the text started with the command prefix
    pub prefixed: bool,
}

impl Invocation {
    /// Trimmed, lower-cased full text, as compared by MATCH and CONTAIN commands.
    #[must_use]
    pub fn normalized_text(&self) -> String {
        self.raw_text.trim().to_lowercase()
    }

    /// Positional argument at `index`, if present and non-empty.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args
            .get(index)
            .map(String::as_str)
            .filter(|a| !a.is_empty())
    }

    /// Keyword argument by key.
    #[must_use]
    pub fn kwarg(&self, key: &str) -> Option<&str> {
        self.kwargs.get(key).map(String::as_str)
    }

    /// All positional arguments re-joined with `", "`, for handlers that take free text.
    #[must_use]
    pub fn rest(&self) -> String {
        self.args.join(", ")
    }
}

/// Splits a parameter string into positional and keyword arguments.
///
/// Every token is trimmed. Empty tokens are kept as empty positional arguments.
#[must_use]
pub fn split_params(rest: &str, delimiter: &str) -> (Vec<String>, HashMap<String, String>) {
    let mut args = Vec::new();
    let mut kwargs = HashMap::new();

    for token in rest.split(delimiter) {
        if let Some((key, value)) = token.split_once('=') {
            kwargs.insert(key.trim().to_string(), value.trim().to_string());
        } else {
            args.push(token.trim().to_string());
        }
    }

    (args, kwargs)
}

/// Parses a message with the given prefix and parameter delimiter.
#[must_use]
pub fn parse(message: &InboundMessage, prefix: &str, delimiter: &str) -> Invocation {
    let mut invocation = Invocation {
        raw_text: message.content.clone(),
        user_id: message.author_id,
        channel_id: message.channel_id,
        guild_id: message.guild_id,
        mentions: message.mentions.clone(),
        ..Invocation::default()
    };

    let Some(body) = message.content.strip_prefix(prefix) else {
        return invocation;
    };
    invocation.prefixed = true;

    match body.split_once(' ') {
        Some((name, rest)) => {
            invocation.command_name = name.to_lowercase();
            let (args, kwargs) = split_params(rest, delimiter);
            invocation.args = args;
            invocation.kwargs = kwargs;
        }
        None => invocation.command_name = body.to_lowercase(),
    }

    invocation
}
