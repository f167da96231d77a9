//! Unified error type for the bot.
//!
//! Every fallible operation in the crate returns [`Result`]. Handler errors are caught by
//! the dispatcher, which shows the user only [`Error::kind`] and the display message.

use thiserror::Error;

/// All errors produced by `shuffle-buddy`.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings file or environment could not be read or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Any failure reported by the database layer
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// A command name is not registered
    #[error("Unknown command: {name}")]
    CommandNotFound {
        /// The lower-cased command name that was looked up
        name: String,
    },

    /// A persisted command refers to a handler that was never registered
    #[error("Unknown handler reference: {handler}")]
    HandlerNotFound {
        /// The handler reference stored alongside the command
        handler: String,
    },

    /// A handler rejected its arguments
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the argument
        message: String,
    },

    /// A stored trigger kind is not one of `prefix`, `match` or `contain`
    #[error("Invalid trigger kind: {value}")]
    InvalidTriggerKind {
        /// The offending stored value
        value: String,
    },

    /// Serenity/Poise framework error
    #[error("Discord error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Short name of the error kind, safe to show to users.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "ConfigError",
            Self::Database(_) => "DatabaseError",
            Self::Io(_) => "IoError",
            Self::EnvVar(_) => "EnvVarError",
            Self::CommandNotFound { .. } => "CommandNotFound",
            Self::HandlerNotFound { .. } => "HandlerNotFound",
            Self::InvalidArgument { .. } => "InvalidArgument",
            Self::InvalidTriggerKind { .. } => "InvalidTriggerKind",
            Self::Framework(_) => "DiscordError",
        }
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
