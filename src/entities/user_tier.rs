//! User tier entity - permission level per Discord user.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User tier database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_tiers")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Discord user id, stored as text
    #[sea_orm(unique)]
    pub user_id: String,
    /// Permission tier; higher is more privileged
    pub tier: i32,
}

/// `UserTier` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
