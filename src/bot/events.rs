//! Gateway event routing.
//!
//! New messages are converted to [`InboundMessage`] and dispatched on their own task, so a
//! handler waiting on a choice prompt never blocks the gateway. Added reactions are
//! published to the session's selection hub, where a waiting prompt may pick them up.

use crate::{
    bot::BotData,
    core::{choice::SelectionEvent, dispatcher, messaging::InboundMessage},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{debug, trace};

/// Converts a Discord message into the transport-neutral form.
#[must_use]
pub fn inbound_message(msg: &serenity::Message) -> InboundMessage {
    InboundMessage {
        author_id: msg.author.id.get(),
        author_is_bot: msg.author.bot,
        channel_id: msg.channel_id.get(),
        guild_id: msg.guild_id.map(serenity::GuildId::get),
        content: msg.content.clone(),
        mentions: msg.mentions.iter().map(|u| u.id.get()).collect(),
    }
}

/// Converts an added reaction into a selection event; reactions without a user are dropped.
#[must_use]
pub fn selection_event(reaction: &serenity::Reaction) -> Option<SelectionEvent> {
    let user_id = reaction.user_id?;
    let serenity::ReactionType::Unicode(marker) = &reaction.emoji else {
        return None;
    };
    Some(SelectionEvent {
        message_id: reaction.message_id.get(),
        user_id: user_id.get(),
        marker: marker.clone(),
    })
}

/// Poise event handler.
pub async fn handle_event(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, BotData, Error>,
    data: &BotData,
) -> Result<()> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            let inbound = inbound_message(new_message);
            let session = Arc::clone(&data.session);
            tokio::spawn(async move {
                let outcome = dispatcher::dispatch(&session, &inbound).await;
                trace!(?outcome, "Dispatch finished");
            });
        }
        serenity::FullEvent::ReactionAdd { add_reaction } => {
            if let Some(selection) = selection_event(add_reaction) {
                debug!(message = selection.message_id, user = selection.user_id, "Reaction added");
                data.session.selections().publish(selection);
            }
        }
        _ => {}
    }
    Ok(())
}
