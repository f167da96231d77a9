/// Database connection and table creation
pub mod database;

/// Bot owner ids from environment variables
pub mod owners;

/// Bot settings loaded from config.toml
pub mod settings;

pub use settings::{BotSettings, ChoiceSettings, CooldownSettings, LookupSettings};
