//! Alias entity - user-defined alternate spellings for canonical names.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Alias database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "aliases")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Alternate spelling, stored lower-cased
    #[sea_orm(unique)]
    pub alias: String,
    /// Canonical name the alias points at
    pub target: String,
}

/// `Alias` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
