//! Bot command entity - the persisted source of truth for the command table.
//!
//! Each row binds a command name to a handler reference registered in the handler
//! catalog at startup. `refresh` rebuilds the in-memory table from these rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Bot command database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bot_commands")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Lower-cased command name or trigger text
    #[sea_orm(unique)]
    pub name: String,
    /// Handler reference in the handler catalog
    pub handler: String,
    /// One of `prefix`, `match`, `contain`
    pub trigger_kind: String,
    /// Minimum tier required to run the command
    pub tier: i32,
    /// Help text
    pub description: String,
}

/// `BotCommand` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
