//! Dispatcher - routes one inbound message to at most one handler.
//!
//! ```text
//! IDLE -> PARSED -> RESOLVED -> AUTHORIZED -> EXECUTING -> { DONE | FAILED }
//!            \           \            \
//!             +-----------+------------+--> REJECTED
//! ```
//!
//! Resolution order is PREFIX, then MATCH, then CONTAIN. Only explicitly invoked (PREFIX)
//! commands tell the user about missing permissions; a MATCH or CONTAIN command the user
//! may not run is dropped silently. A handler always runs once authorized; cooldowns only
//! affect its reply.

use crate::core::{
    command::{CommandContext, CommandOutput},
    messaging::{InboundMessage, OutgoingMessage},
    parser::{self, Invocation},
    registry::{CommandEntry, CommandTable, TriggerKind},
    session::Session,
};
use tracing::{error, info, instrument, trace};

/// Why a message was dropped before parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Sent by an automated account
    BotAuthor,
    /// Restricted mode and the channel is not whitelisted
    RestrictedChannel,
}

/// Why a parsed message did not run a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// No prefix and no MATCH/CONTAIN command applies
    NotACommand,
    /// Prefixed, but no command of that name
    UnknownCommand(String),
    /// The user's tier is below the command's tier
    Unauthorized {
        /// Command name
        command: String,
        /// Tier the command requires
        required: i32,
        /// Tier the user has
        tier: i32,
    },
}

/// Terminal state of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Dropped by an ignore rule
    Ignored(IgnoreReason),
    /// Parsed but not executed
    Rejected(Rejection),
    /// Handler ran and returned an output
    Done {
        /// Command name
        command: String,
        /// What the handler returned
        output: CommandOutput,
    },
    /// Handler returned an error
    Failed {
        /// Command name
        command: String,
        /// Error kind shown to the user
        kind: &'static str,
        /// Error message shown to the user
        message: String,
    },
}

/// Finds the command a message triggers, honoring PREFIX > MATCH > CONTAIN.
#[must_use]
pub fn resolve(table: &CommandTable, invocation: &Invocation) -> Option<CommandEntry> {
    if invocation.prefixed {
        if let Some(entry) = table.find_prefix(&invocation.command_name) {
            return Some(entry.clone());
        }
    }
    let normalized = invocation.normalized_text();
    table
        .find_match(&normalized)
        .or_else(|| table.find_contain(&normalized))
        .cloned()
}

/// Handles one inbound message end to end.
#[instrument(skip_all, fields(user = message.author_id, channel = message.channel_id))]
pub async fn dispatch(session: &Session, message: &InboundMessage) -> DispatchOutcome {
    if message.author_is_bot {
        return DispatchOutcome::Ignored(IgnoreReason::BotAuthor);
    }

    let settings = session.settings();
    let tier = session.tier_of(message.author_id).await;
    if settings.restricted_mode
        && tier < settings.max_tier
        && !settings.whitelisted_channels.contains(&message.channel_id)
    {
        return DispatchOutcome::Ignored(IgnoreReason::RestrictedChannel);
    }

    let invocation = parser::parse(message, &settings.prefix, &settings.delimiter);

    let resolved = resolve(&*session.commands().await, &invocation);
    let Some(entry) = resolved else {
        if invocation.prefixed {
            info!(command = %invocation.command_name, "Unknown command");
            return DispatchOutcome::Rejected(Rejection::UnknownCommand(invocation.command_name));
        }
        return DispatchOutcome::Rejected(Rejection::NotACommand);
    };
    trace!(command = %entry.name, trigger = %entry.trigger, "Resolved command");

    let ctx = CommandContext {
        session,
        invocation: &invocation,
        tier,
    };

    if tier < entry.tier {
        if entry.trigger == TriggerKind::Prefix {
            info!(command = %entry.name, tier, required = entry.tier, "Restricted command denied");
            let notice = OutgoingMessage::text(format!(
                "Restricted access: `{}` requires tier {} (you are tier {}).",
                entry.name, entry.tier, tier
            ));
            if let Err(e) = ctx.say(notice).await {
                error!("Failed to send restricted access notice: {}", e);
            }
        }
        return DispatchOutcome::Rejected(Rejection::Unauthorized {
            command: entry.name,
            required: entry.tier,
            tier,
        });
    }

    let user_lock = session.user_lock(invocation.user_id).await;
    let outcome = {
        let _serialized = user_lock.lock().await;
        execute(&ctx, entry).await
    };
    session.release_user_lock(invocation.user_id, user_lock).await;
    outcome
}

/// Runs an authorized handler and delivers what it produced.
async fn execute(ctx: &CommandContext<'_>, entry: CommandEntry) -> DispatchOutcome {
    info!(command = %entry.name, args = ?ctx.invocation.args, "Running command");
    match entry.handler.run(ctx).await {
        Ok(output) => {
            match &output {
                CommandOutput::Reply(reply) => {
                    if let Err(e) = ctx.say(reply.clone()).await {
                        error!(command = %entry.name, "Failed to send reply: {}", e);
                    }
                }
                CommandOutput::Log(line) => info!(command = %entry.name, audit = %line, "Command result"),
                CommandOutput::Silent => {}
            }
            DispatchOutcome::Done {
                command: entry.name,
                output,
            }
        }
        Err(e) => {
            error!(command = %entry.name, error = ?e, "Command failed");
            let notice = OutgoingMessage::text(format!(
                "Something went wrong running `{}`: {}: {}",
                entry.name,
                e.kind(),
                e
            ));
            if let Err(send_err) = ctx.say(notice).await {
                error!("Failed to send failure notice: {}", send_err);
            }
            DispatchOutcome::Failed {
                command: entry.name,
                kind: e.kind(),
                message: e.to_string(),
            }
        }
    }
}
