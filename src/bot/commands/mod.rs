//! Command implementations.
//!
//! Text commands are [`BotCommand`](crate::core::command::BotCommand) values registered in
//! the catalog returned by [`builtin_handlers`]; `ping` and `commands` are poise slash
//! commands.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Privileged alias, tier and registry commands
pub mod admin;
/// Conversational MATCH and CONTAIN triggers
pub mod fun;
/// Slash commands
pub mod general;
/// The `help` listing
pub mod help;
/// Pokémon and skill lookups
pub mod lookup;
/// Stage lookups
pub mod stage;

pub use general::*;

use crate::core::{
    command::{BotCommand, CommandSpec, HandlerCatalog},
    registry::TriggerKind,
};
use std::sync::Arc;

/// Every built-in handler, with the command rows seeded for an empty database.
#[must_use]
pub fn builtin_handlers() -> HandlerCatalog {
    use TriggerKind::{Contain, Match, Prefix};

    let mut catalog = HandlerCatalog::new();
    let mut add = |name: &str,
                   handler: &str,
                   trigger: TriggerKind,
                   tier: i32,
                   description: &str,
                   run: Arc<dyn BotCommand>| {
        catalog.insert_default(CommandSpec::new(name, handler, trigger, tier, description), run);
    };

    add("pokemon", "pokemon", Prefix, 0, "Look up a Pokémon", Arc::new(lookup::PokemonLookup));
    add("skill", "skill", Prefix, 0, "Look up a skill", Arc::new(lookup::SkillLookup));
    add("stage", "stage", Prefix, 0, "Look up a stage by number", Arc::new(stage::StageLookup));
    add("next", "next", Prefix, 0, "Show the stage after your last one", Arc::new(stage::NextStage));
    add(
        "stagepokemon",
        "stagepokemon",
        Prefix,
        0,
        "Show the Pokémon of your last stage",
        Arc::new(stage::StagePokemon),
    );
    add("help", "help", Prefix, 0, "List the commands you can use", Arc::new(help::Help));
    add("addalias", "addalias", Prefix, 2, "Add a name alias", Arc::new(admin::AddAlias));
    add("removealias", "removealias", Prefix, 2, "Remove a name alias", Arc::new(admin::RemoveAlias));
    add("settier", "settier", Prefix, 3, "Set a user's permission tier", Arc::new(admin::SetTier));
    add("addcommand", "addcommand", Prefix, 3, "Register a command", Arc::new(admin::AddCommand));
    add("removecommand", "removecommand", Prefix, 3, "Unregister a command", Arc::new(admin::RemoveCommand));
    add("refresh", "refresh", Prefix, 3, "Reload commands from storage", Arc::new(admin::Refresh));
    add("good bot", "goodbot", Match, 0, "", Arc::new(fun::GoodBot));
    add("(╯°□°)╯︵ ┻━┻", "tableflip", Contain, 0, "", Arc::new(fun::TableFlip));

    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{command_store, dispatcher};
    use crate::errors::Result;
    use crate::test_utils::*;

    #[test]
    fn test_every_default_has_a_handler() {
        let catalog = builtin_handlers();
        assert_eq!(catalog.defaults().len(), 14);
        for spec in catalog.defaults() {
            assert!(catalog.get(&spec.handler).is_ok(), "{}", spec.handler);
        }
    }

    #[tokio::test]
    async fn test_seeded_defaults_build_full_table() -> Result<()> {
        let catalog = builtin_handlers();
        let defaults = catalog.defaults().to_vec();
        let (session, _messenger) = test_session(catalog, test_settings()).await?;

        command_store::seed_default_commands(session.db(), &defaults).await?;
        assert_eq!(session.refresh_commands().await?, 14);
        assert!(session.commands().await.find_match("good bot").is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_conversational_triggers() -> Result<()> {
        let catalog = builtin_handlers();
        let defaults = catalog.defaults().to_vec();
        let (session, messenger) = test_session(catalog, test_settings()).await?;
        command_store::seed_default_commands(session.db(), &defaults).await?;
        session.refresh_commands().await?;

        dispatcher::dispatch(&session, &user_message(1, 10, "  Good Bot ")).await;
        dispatcher::dispatch(&session, &user_message(1, 10, "ugh (╯°□°)╯︵ ┻━┻")).await;
        dispatcher::dispatch(&session, &user_message(1, 10, "good bot!")).await;

        assert_eq!(messenger.sent_texts(), vec![fun::THANKS, fun::UNFLIP]);
        Ok(())
    }

    #[tokio::test]
    async fn test_help_lists_only_visible_commands() -> Result<()> {
        let catalog = builtin_handlers();
        let defaults = catalog.defaults().to_vec();
        let (session, messenger) = test_session(catalog, test_settings()).await?;
        command_store::seed_default_commands(session.db(), &defaults).await?;
        session.refresh_commands().await?;

        dispatcher::dispatch(&session, &user_message(1, 10, "?help")).await;

        let embed = &messenger.sent_embeds()[0];
        let listing = embed.description.as_deref().unwrap_or_default();
        assert!(listing.contains("`?stage`"));
        assert!(listing.contains("\"good bot\""));
        assert!(!listing.contains("settier"));
        assert!(!listing.contains("addalias"));
        Ok(())
    }
}
