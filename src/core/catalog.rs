//! Game catalog queries - Pokémon, skills, stages and aliases.
//!
//! These are plain `SeaORM` lookups; the resolver decides what a user meant, this module
//! only fetches. Alias keys are stored lower-cased so lookups stay case-insensitive.

use crate::{
    core::resolver::{EntityClass, LookupTables},
    entities::{Alias, Pokemon, Skill, Stage, alias, pokemon, skill, stage},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use tracing::debug;

/// All canonical names of an entity class, alphabetically.
pub async fn get_canonical_names(db: &DatabaseConnection, class: EntityClass) -> Result<Vec<String>> {
    let names = match class {
        EntityClass::Pokemon => {
            Pokemon::find()
                .select_only()
                .column(pokemon::Column::Name)
                .order_by_asc(pokemon::Column::Name)
                .into_tuple::<String>()
                .all(db)
                .await?
        }
        EntityClass::Skill => {
            Skill::find()
                .select_only()
                .column(skill::Column::Name)
                .order_by_asc(skill::Column::Name)
                .into_tuple::<String>()
                .all(db)
                .await?
        }
    };
    Ok(names)
}

/// All `(alias, target)` pairs.
pub async fn get_aliases(db: &DatabaseConnection) -> Result<Vec<(String, String)>> {
    Ok(Alias::find()
        .order_by_asc(alias::Column::Alias)
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.alias, a.target))
        .collect())
}

/// Canonical names and aliases for one class, ready for resolution.
pub async fn load_lookup_tables(db: &DatabaseConnection, class: EntityClass) -> Result<LookupTables> {
    let canonical = get_canonical_names(db, class).await?;
    let aliases = get_aliases(db).await?;
    debug!(
        %class,
        canonical = canonical.len(),
        aliases = aliases.len(),
        "Loaded lookup tables"
    );
    Ok(LookupTables::new(canonical, aliases))
}

/// Adds an alias or re-points an existing one.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] if the alias or target is blank.
pub async fn set_alias(db: &DatabaseConnection, alias_name: &str, target: &str) -> Result<alias::Model> {
    let key = alias_name.trim().to_lowercase();
    let target = target.trim();
    if key.is_empty() || target.is_empty() {
        return Err(Error::InvalidArgument {
            message: "alias and target cannot be empty".to_string(),
        });
    }

    match Alias::find()
        .filter(alias::Column::Alias.eq(key.as_str()))
        .one(db)
        .await?
    {
        Some(existing) => {
            let mut active: alias::ActiveModel = existing.into();
            active.target = Set(target.to_string());
            active.update(db).await.map_err(Into::into)
        }
        None => alias::ActiveModel {
            alias: Set(key),
            target: Set(target.to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(Into::into),
    }
}

/// Removes an alias; returns whether one existed.
pub async fn remove_alias(db: &DatabaseConnection, alias_name: &str) -> Result<bool> {
    let result = Alias::delete_many()
        .filter(alias::Column::Alias.eq(alias_name.trim().to_lowercase()))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Pokémon by exact canonical name.
pub async fn get_pokemon(db: &DatabaseConnection, name: &str) -> Result<Option<pokemon::Model>> {
    Pokemon::find()
        .filter(pokemon::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Skill by exact canonical name.
pub async fn get_skill(db: &DatabaseConnection, name: &str) -> Result<Option<skill::Model>> {
    Skill::find()
        .filter(skill::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Stage by its in-game index.
pub async fn get_stage(db: &DatabaseConnection, index: i32) -> Result<Option<stage::Model>> {
    Stage::find()
        .filter(stage::Column::StageIndex.eq(index))
        .one(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_canonical_names_per_class() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_pokemon(&db, "Pikachu").await?;
        create_test_pokemon(&db, "Eevee").await?;
        create_test_skill(&db, "Power of 4").await?;

        assert_eq!(
            get_canonical_names(&db, EntityClass::Pokemon).await?,
            vec!["Eevee", "Pikachu"]
        );
        assert_eq!(
            get_canonical_names(&db, EntityClass::Skill).await?,
            vec!["Power of 4"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_set_alias_inserts_then_updates() -> Result<()> {
        let db = setup_test_db().await?;
        set_alias(&db, "Pika", "Pikachu").await?;
        set_alias(&db, "pika", "Pichu").await?;

        let aliases = get_aliases(&db).await?;
        assert_eq!(aliases, vec![("pika".to_string(), "Pichu".to_string())]);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_alias_rejects_blank() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(matches!(
            set_alias(&db, "  ", "Pikachu").await,
            Err(Error::InvalidArgument { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_alias() -> Result<()> {
        let db = setup_test_db().await?;
        set_alias(&db, "pika", "Pikachu").await?;
        assert!(remove_alias(&db, "PIKA").await?);
        assert!(!remove_alias(&db, "pika").await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_lookup_tables_resolves_alias() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_pokemon(&db, "Pikachu").await?;
        set_alias(&db, "pika", "Pikachu").await?;

        let tables = load_lookup_tables(&db, EntityClass::Pokemon).await?;
        assert_eq!(tables.resolve_exact("Pika").as_deref(), Some("Pikachu"));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_records() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_pokemon(&db, "Pikachu").await?;
        create_test_stage(&db, 1, "Pikachu").await?;

        assert_eq!(get_pokemon(&db, "Pikachu").await?.unwrap().name, "Pikachu");
        assert!(get_skill(&db, "Nope").await?.is_none());
        assert_eq!(get_stage(&db, 1).await?.unwrap().pokemon, "Pikachu");
        assert!(get_stage(&db, 2).await?.is_none());
        Ok(())
    }
}
