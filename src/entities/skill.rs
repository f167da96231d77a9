//! Skill entity - passive skills Pokémon can carry.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Skill database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "skills")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Canonical skill name (e.g. "Power of 4")
    #[sea_orm(unique)]
    pub name: String,
    /// In-game effect text
    pub description: String,
}

/// `Skill` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
