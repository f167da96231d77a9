//! `pokemon` and `skill` - name lookups with alias and fuzzy resolution.

use crate::{
    core::{
        catalog,
        command::{BotCommand, CommandContext, CommandOutput},
        history::{QueryKind, UserQuery},
        messaging::{Embed, OutgoingMessage},
        resolver::EntityClass,
    },
    entities::{pokemon, skill},
    errors::{Error, Result},
};
use async_trait::async_trait;

const POKEMON_COLOR: u32 = 0xE3_35_0D;
const SKILL_COLOR: u32 = 0x3B_4C_CA;

/// The free-text name argument: `name=` if given, otherwise the whole argument text.
fn name_argument(ctx: &CommandContext<'_>, usage: &str) -> Result<String> {
    let name = ctx
        .invocation
        .kwarg("name")
        .map_or_else(|| ctx.invocation.rest(), str::to_string);
    if name.trim().is_empty() {
        return Err(Error::InvalidArgument {
            message: format!("usage: {}{usage}", ctx.session.settings().prefix),
        });
    }
    Ok(name.trim().to_string())
}

/// Embed describing one Pokémon.
#[must_use]
pub fn pokemon_embed(model: &pokemon::Model) -> Embed {
    Embed::new(&model.name)
        .field("Type", &model.kind)
        .field("BP", model.base_power)
        .field("Skill", &model.skill)
        .color(POKEMON_COLOR)
}

fn skill_embed(model: &skill::Model) -> Embed {
    Embed::new(&model.name)
        .description(&model.description)
        .color(SKILL_COLOR)
}

/// Looks up a Pokémon by name or alias.
pub struct PokemonLookup;

#[async_trait]
impl BotCommand for PokemonLookup {
    async fn run(&self, ctx: &CommandContext<'_>) -> Result<CommandOutput> {
        let query = name_argument(ctx, "pokemon <name>")?;
        let Some(name) = ctx.resolve(&query, EntityClass::Pokemon, true).await? else {
            return Ok(CommandOutput::Silent);
        };
        ctx.remember(UserQuery::new(QueryKind::Any, vec![name.clone()]))
            .await;

        Ok(match catalog::get_pokemon(ctx.session.db(), &name).await? {
            Some(model) => CommandOutput::Reply(OutgoingMessage::embed(pokemon_embed(&model))),
            None => CommandOutput::text(format!("No data recorded for `{name}`.")),
        })
    }
}

/// Looks up a skill by name or alias.
pub struct SkillLookup;

#[async_trait]
impl BotCommand for SkillLookup {
    async fn run(&self, ctx: &CommandContext<'_>) -> Result<CommandOutput> {
        let query = name_argument(ctx, "skill <name>")?;
        let Some(name) = ctx.resolve(&query, EntityClass::Skill, true).await? else {
            return Ok(CommandOutput::Silent);
        };

        Ok(match catalog::get_skill(ctx.session.db(), &name).await? {
            Some(model) => CommandOutput::Reply(OutgoingMessage::embed(skill_embed(&model))),
            None => CommandOutput::text(format!("No data recorded for `{name}`.")),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::bot::commands::builtin_handlers;
    use crate::core::{dispatcher, session::Session};
    use crate::test_utils::*;
    use std::sync::Arc;

    async fn seeded() -> Result<(Arc<Session>, Arc<RecordingMessenger>)> {
        let catalog = builtin_handlers();
        let defaults = catalog.defaults().to_vec();
        let (session, messenger) = test_session(catalog, test_settings()).await?;
        for spec in &defaults {
            session.add_command(spec).await?;
        }
        create_test_pokemon(session.db(), "Pikachu").await?;
        create_test_pokemon(session.db(), "Pichu").await?;
        create_test_skill(session.db(), "Opportunist").await?;
        catalog::set_alias(session.db(), "pika", "Pikachu").await?;
        Ok((session, messenger))
    }

    #[tokio::test]
    async fn test_exact_name_replies_without_prompt() -> Result<()> {
        let (session, messenger) = seeded().await?;

        dispatcher::dispatch(&session, &user_message(1, 10, "?pokemon pikachu")).await;

        let embeds = messenger.sent_embeds();
        assert_eq!(embeds.len(), 1);
        assert_eq!(embeds[0].title, "Pikachu");
        assert!(messenger.markers().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_alias_resolves_and_is_remembered() -> Result<()> {
        let (session, messenger) = seeded().await?;

        dispatcher::dispatch(&session, &user_message(1, 10, "?pokemon PIKA")).await;

        assert_eq!(messenger.sent_embeds()[0].title, "Pikachu");
        let last = session.last_query(1, QueryKind::Any).await.unwrap();
        assert_eq!(last.args, vec!["Pikachu"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_misspelling_offers_choice_and_uses_selection() -> Result<()> {
        let (session, messenger) = seeded().await?;
        messenger.select_on_prompt(session.selections().clone(), 1, 1);

        dispatcher::dispatch(&session, &user_message(1, 10, "?pokemon pikachoo")).await;

        let texts = messenger.sent_texts();
        assert!(texts[0].contains("Did you mean"));
        assert!(texts[0].contains("Pikachu"));
        assert_eq!(messenger.sent_embeds()[0].title, "Pikachu");
        Ok(())
    }

    #[tokio::test]
    async fn test_unrecognized_name_is_reported() -> Result<()> {
        let (session, messenger) = seeded().await?;

        dispatcher::dispatch(&session, &user_message(1, 10, "?pokemon zzzzzz")).await;

        assert_eq!(
            messenger.sent_texts(),
            vec!["`zzzzzz` is not a recognized pokemon name."]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_name_reports_usage() -> Result<()> {
        let (session, messenger) = seeded().await?;

        let outcome = dispatcher::dispatch(&session, &user_message(1, 10, "?skill")).await;

        assert!(matches!(
            outcome,
            dispatcher::DispatchOutcome::Failed { kind: "InvalidArgument", .. }
        ));
        assert!(messenger.sent_texts()[0].contains("usage: ?skill <name>"));
        Ok(())
    }

    #[tokio::test]
    async fn test_skill_lookup() -> Result<()> {
        let (session, messenger) = seeded().await?;

        dispatcher::dispatch(&session, &user_message(1, 10, "?skill opportunist")).await;

        let embeds = messenger.sent_embeds();
        assert_eq!(embeds[0].title, "Opportunist");
        assert_eq!(
            embeds[0].description.as_deref(),
            Some("Opportunist does something useful")
        );
        Ok(())
    }
}
