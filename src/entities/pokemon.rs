//! Pokémon entity - one row per Pokémon in the catalog.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Pokémon database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pokemon")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Canonical name (e.g. "Mega Gengar")
    #[sea_orm(unique)]
    pub name: String,
    /// Elemental type (e.g. "Ghost")
    pub kind: String,
    /// Attack power at level 1
    pub base_power: i32,
    /// Name of the Pokémon's default skill
    pub skill: String,
}

/// `Pokemon` has no foreign keys; skills and stages refer to it by name
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
