//! Core routing logic - framework-agnostic parsing, dispatch, permissions and lookups.
//!
//! Nothing in this module depends on Discord. The bot layer converts gateway events into
//! [`messaging::InboundMessage`] values and implements [`messaging::Messenger`].

/// Game data lookups (Pokémon, skills, stages, aliases)
pub mod catalog;
/// Interactive numbered-choice prompts
pub mod choice;
/// Handler trait, handler catalog and command context
pub mod command;
/// Persistence of the command registry
pub mod command_store;
/// Message routing state machine
pub mod dispatcher;
/// Per-user query history
pub mod history;
/// Transport-neutral message types and the messenger seam
pub mod messaging;
/// Message parsing into invocations
pub mod parser;
/// Per-user permission tiers
pub mod permissions;
/// Channel and user reply cooldowns
pub mod rate_limit;
/// In-memory command table
pub mod registry;
/// Exact and fuzzy name resolution
pub mod resolver;
/// Session state shared by the dispatcher and handlers
pub mod session;
