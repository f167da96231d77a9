//! Permission store - per-user tiers backed by the `user_tiers` table.

use crate::{
    core::messaging::UserId,
    entities::{UserTier, user_tier},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::info;

/// Stored tier of a user, `None` when the user has never been assigned one.
pub async fn get_tier(db: &DatabaseConnection, user: UserId) -> Result<Option<i32>> {
    Ok(UserTier::find()
        .filter(user_tier::Column::UserId.eq(user.to_string()))
        .one(db)
        .await?
        .map(|row| row.tier))
}

/// Sets a user's tier, creating the row if needed.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] for negative tiers.
pub async fn set_tier(db: &DatabaseConnection, user: UserId, tier: i32) -> Result<user_tier::Model> {
    if tier < 0 {
        return Err(Error::InvalidArgument {
            message: format!("tier must be zero or more, got {tier}"),
        });
    }

    let existing = UserTier::find()
        .filter(user_tier::Column::UserId.eq(user.to_string()))
        .one(db)
        .await?;
    let model = match existing {
        Some(row) => {
            let mut active: user_tier::ActiveModel = row.into();
            active.tier = Set(tier);
            active.update(db).await?
        }
        None => {
            user_tier::ActiveModel {
                user_id: Set(user.to_string()),
                tier: Set(tier),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };
    info!(user, tier, "Stored user tier");
    Ok(model)
}

/// Gives every owner the maximum tier.
pub async fn seed_owner_tiers(db: &DatabaseConnection, owners: &[UserId], max_tier: i32) -> Result<()> {
    for owner in owners {
        set_tier(db, *owner, max_tier).await?;
    }
    Ok(())
}
