//! Stage entity - main stages, addressed by their in-game index.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stage database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stages")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// In-game stage number
    #[sea_orm(unique)]
    pub stage_index: i32,
    /// Canonical name of the Pokémon fought in this stage
    pub pokemon: String,
    /// Hit points of the stage Pokémon
    pub hp: i32,
    /// Moves available to the player
    pub moves: i32,
}

/// `Stage` refers to Pokémon by name only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
