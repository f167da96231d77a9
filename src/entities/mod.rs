//! Entity module - Contains all SeaORM entity definitions for the database.
//! Catalog tables (Pokémon, skills, stages, aliases) are read by lookups; the
//! `user_tiers` and `bot_commands` tables back permissions and the command table.

pub mod alias;
pub mod bot_command;
pub mod pokemon;
pub mod skill;
pub mod stage;
pub mod user_tier;

// Re-export specific types to avoid conflicts
pub use alias::{Column as AliasColumn, Entity as Alias, Model as AliasModel};
pub use bot_command::{
    Column as BotCommandColumn, Entity as BotCommand, Model as BotCommandModel,
};
pub use pokemon::{Column as PokemonColumn, Entity as Pokemon, Model as PokemonModel};
pub use skill::{Column as SkillColumn, Entity as Skill, Model as SkillModel};
pub use stage::{Column as StageColumn, Entity as Stage, Model as StageModel};
pub use user_tier::{Column as UserTierColumn, Entity as UserTier, Model as UserTierModel};
