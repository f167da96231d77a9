//! `stage`, `next` and `stagepokemon` - stage lookups that build on the user's history.

use crate::{
    bot::commands::lookup::pokemon_embed,
    core::{
        catalog,
        command::{BotCommand, CommandContext, CommandOutput},
        history::{QueryKind, UserQuery},
        messaging::{Embed, OutgoingMessage},
    },
    entities::stage,
    errors::{Error, Result},
};
use async_trait::async_trait;

const STAGE_COLOR: u32 = 0x2E_CC_71;

fn parse_index(raw: &str) -> Result<i32> {
    raw.trim().parse().map_err(|_| Error::InvalidArgument {
        message: format!("`{}` is not a stage number", raw.trim()),
    })
}

fn stage_embed(model: &stage::Model) -> Embed {
    Embed::new(format!("Stage {}", model.stage_index))
        .field("Pokémon", &model.pokemon)
        .field("HP", model.hp)
        .field("Moves", model.moves)
        .color(STAGE_COLOR)
}

/// Index of the user's most recent stage lookup.
async fn last_stage_index(ctx: &CommandContext<'_>) -> Result<Option<i32>> {
    let Some(query) = ctx.last_query(QueryKind::Stage).await else {
        return Ok(None);
    };
    query.args.first().map(|raw| parse_index(raw)).transpose()
}

/// Shows a stage and records it as the user's latest stage query.
async fn show_stage(ctx: &CommandContext<'_>, index: i32) -> Result<CommandOutput> {
    ctx.remember(UserQuery::new(QueryKind::Stage, vec![index.to_string()]))
        .await;
    Ok(match catalog::get_stage(ctx.session.db(), index).await? {
        Some(model) => CommandOutput::Reply(OutgoingMessage::embed(stage_embed(&model))),
        None => CommandOutput::text(format!("Stage {index} does not exist.")),
    })
}

const NO_HISTORY: &str = "You haven't looked up a stage yet.";

/// Looks up a stage by number (`?stage 42` or `?stage index=42`).
pub struct StageLookup;

#[async_trait]
impl BotCommand for StageLookup {
    async fn run(&self, ctx: &CommandContext<'_>) -> Result<CommandOutput> {
        let raw = ctx
            .invocation
            .kwarg("index")
            .or_else(|| ctx.invocation.arg(0))
            .ok_or_else(|| Error::InvalidArgument {
                message: format!("usage: {}stage <number>", ctx.session.settings().prefix),
            })?;
        show_stage(ctx, parse_index(raw)?).await
    }
}

/// Shows the stage after the user's last stage lookup.
pub struct NextStage;

#[async_trait]
impl BotCommand for NextStage {
    async fn run(&self, ctx: &CommandContext<'_>) -> Result<CommandOutput> {
        match last_stage_index(ctx).await? {
            Some(index) => {
                let next = index.checked_add(1).ok_or_else(|| Error::InvalidArgument {
                    message: format!("stage {index} is the last stage number"),
                })?;
                show_stage(ctx, next).await
            }
            None => Ok(CommandOutput::text(NO_HISTORY)),
        }
    }
}

/// Shows the Pokémon of the user's last looked-up stage.
pub struct StagePokemon;

#[async_trait]
impl BotCommand for StagePokemon {
    async fn run(&self, ctx: &CommandContext<'_>) -> Result<CommandOutput> {
        let Some(index) = last_stage_index(ctx).await? else {
            return Ok(CommandOutput::text(NO_HISTORY));
        };
        let db = ctx.session.db();
        let Some(stage) = catalog::get_stage(db, index).await? else {
            return Ok(CommandOutput::text(format!("Stage {index} does not exist.")));
        };
        Ok(match catalog::get_pokemon(db, &stage.pokemon).await? {
            Some(model) => CommandOutput::Reply(OutgoingMessage::embed(pokemon_embed(&model))),
            None => CommandOutput::text(format!("No data recorded for `{}`.", stage.pokemon)),
        })
    }
}
