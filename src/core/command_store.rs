//! Command registry persistence - the `bot_commands` table.
//!
//! The table is the source of truth for the in-memory command table. Privileged commands
//! write through it, and `refresh` rebuilds the in-memory table from it.

use crate::{
    core::{command::CommandSpec, registry::TriggerKind},
    entities::{BotCommand, bot_command},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use tracing::info;

/// All persisted commands in insertion order.
///
/// Insertion order is registration order, which decides MATCH and CONTAIN precedence.
pub async fn load_commands(db: &DatabaseConnection) -> Result<Vec<bot_command::Model>> {
    BotCommand::find()
        .order_by_asc(bot_command::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts a command or updates the row with the same name.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] for a blank name or handler, or a negative tier.
pub async fn save_command(db: &DatabaseConnection, spec: &CommandSpec) -> Result<bot_command::Model> {
    let name = spec.name.trim().to_lowercase();
    if name.is_empty() || spec.handler.trim().is_empty() {
        return Err(Error::InvalidArgument {
            message: "command name and handler cannot be empty".to_string(),
        });
    }
    if spec.tier < 0 {
        return Err(Error::InvalidArgument {
            message: format!("tier must be zero or more, got {}", spec.tier),
        });
    }

    let existing = BotCommand::find()
        .filter(bot_command::Column::Name.eq(name.as_str()))
        .one(db)
        .await?;
    let handler = spec.handler.trim().to_string();
    let trigger = spec.trigger.as_str().to_string();
    let model = match existing {
        Some(row) => {
            let mut active: bot_command::ActiveModel = row.into();
            active.handler = Set(handler);
            active.trigger_kind = Set(trigger);
            active.tier = Set(spec.tier);
            active.description = Set(spec.description.clone());
            active.update(db).await?
        }
        None => {
            bot_command::ActiveModel {
                name: Set(name),
                handler: Set(handler),
                trigger_kind: Set(trigger),
                tier: Set(spec.tier),
                description: Set(spec.description.clone()),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };
    Ok(model)
}

/// Deletes a command by name; returns whether it existed.
pub async fn delete_command(db: &DatabaseConnection, name: &str) -> Result<bool> {
    let result = BotCommand::delete_many()
        .filter(bot_command::Column::Name.eq(name.trim().to_lowercase()))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Seeds the table with `defaults` when it is empty; returns the number inserted.
pub async fn seed_default_commands(db: &DatabaseConnection, defaults: &[CommandSpec]) -> Result<usize> {
    if BotCommand::find().count(db).await? > 0 {
        return Ok(0);
    }
    for spec in defaults {
        save_command(db, spec).await?;
    }
    info!("Seeded {} default commands", defaults.len());
    Ok(defaults.len())
}

/// Parses the stored trigger kind of a row.
pub fn trigger_of(row: &bot_command::Model) -> Result<TriggerKind> {
    row.trigger_kind.parse()
}
