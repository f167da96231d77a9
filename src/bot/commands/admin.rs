//! Privileged commands - aliases, tiers and the command registry.
//!
//! Every change here is written to the database first, so a `refresh` or a restart sees
//! the same state as the running bot.

use crate::{
    core::{
        catalog,
        command::{BotCommand, CommandContext, CommandOutput, CommandSpec},
        messaging::UserId,
        permissions,
        registry::TriggerKind,
        resolver::EntityClass,
    },
    errors::{Error, Result},
};
use async_trait::async_trait;

fn required<'a>(ctx: &'a CommandContext<'_>, index: usize, usage: &str) -> Result<&'a str> {
    ctx.invocation
        .arg(index)
        .ok_or_else(|| Error::InvalidArgument {
            message: format!("usage: {}{usage}", ctx.session.settings().prefix),
        })
}

/// Parses a raw user id or a `<@id>` / `<@!id>` mention.
#[must_use]
pub fn parse_user_id(raw: &str) -> Option<UserId> {
    let trimmed = raw.trim();
    let id = trimmed
        .strip_prefix("<@")
        .and_then(|rest| rest.strip_suffix('>'))
        .map_or(trimmed, |inner| inner.trim_start_matches('!'));
    id.parse().ok()
}

/// Adds or re-points an alias: `?addalias <alias>, <pokemon or skill>`.
pub struct AddAlias;

#[async_trait]
impl BotCommand for AddAlias {
    async fn run(&self, ctx: &CommandContext<'_>) -> Result<CommandOutput> {
        const USAGE: &str = "addalias <alias>, <name>";
        let alias = required(ctx, 0, USAGE)?;
        let target = required(ctx, 1, USAGE)?;

        let db = ctx.session.db();
        let mut canonical = None;
        for class in [EntityClass::Pokemon, EntityClass::Skill] {
            canonical = catalog::load_lookup_tables(db, class)
                .await?
                .resolve_exact(target);
            if canonical.is_some() {
                break;
            }
        }
        let Some(canonical) = canonical else {
            return Err(Error::InvalidArgument {
                message: format!("`{target}` is not a known Pokémon or skill"),
            });
        };

        catalog::set_alias(db, alias, &canonical).await?;
        Ok(CommandOutput::text(format!(
            "`{}` now refers to {canonical}.",
            alias.to_lowercase()
        )))
    }
}

/// Removes an alias: `?removealias <alias>`.
pub struct RemoveAlias;

#[async_trait]
impl BotCommand for RemoveAlias {
    async fn run(&self, ctx: &CommandContext<'_>) -> Result<CommandOutput> {
        let alias = required(ctx, 0, "removealias <alias>")?;
        Ok(if catalog::remove_alias(ctx.session.db(), alias).await? {
            CommandOutput::text(format!("Alias `{}` removed.", alias.to_lowercase()))
        } else {
            CommandOutput::text(format!("There is no alias `{}`.", alias.to_lowercase()))
        })
    }
}

/// Sets the tier of mentioned users, or of a user id: `?settier @user, <tier>`.
///
/// Callers may not hand out a tier above their own.
pub struct SetTier;

#[async_trait]
impl BotCommand for SetTier {
    async fn run(&self, ctx: &CommandContext<'_>) -> Result<CommandOutput> {
        const USAGE: &str = "settier <@user or id>, <tier>";
        let invocation = ctx.invocation;
        let raw_tier = match invocation.kwarg("tier") {
            Some(raw) => raw,
            None => invocation
                .args
                .iter()
                .rev()
                .find(|a| !a.is_empty())
                .map(String::as_str)
                .ok_or_else(|| Error::InvalidArgument {
                    message: format!("usage: {}{USAGE}", ctx.session.settings().prefix),
                })?,
        };
        let tier: i32 = raw_tier.trim().parse().map_err(|_| Error::InvalidArgument {
            message: format!("`{raw_tier}` is not a tier"),
        })?;
        if tier > ctx.tier {
            return Err(Error::InvalidArgument {
                message: format!("you cannot grant tier {tier} (your tier is {})", ctx.tier),
            });
        }

        let users: Vec<UserId> = if invocation.mentions.is_empty() {
            required(ctx, 0, USAGE)
                .ok()
                .and_then(parse_user_id)
                .into_iter()
                .collect()
        } else {
            invocation.mentions.clone()
        };
        if users.is_empty() {
            return Err(Error::InvalidArgument {
                message: "no user given".to_string(),
            });
        }

        for user in &users {
            permissions::set_tier(ctx.session.db(), *user, tier).await?;
        }
        Ok(CommandOutput::Log(format!(
            "user {} set tier {tier} for {users:?}",
            invocation.user_id
        )))
    }
}

/// Registers a command: `?addcommand <name>, <handler>[, <trigger>[, <tier>[, <description>]]]`.
///
/// Keyword forms `trigger=`, `tier=` and `description=` are accepted too.
pub struct AddCommand;

#[async_trait]
impl BotCommand for AddCommand {
    async fn run(&self, ctx: &CommandContext<'_>) -> Result<CommandOutput> {
        const USAGE: &str = "addcommand <name>, <handler>[, <trigger>[, <tier>[, <description>]]]";
        let invocation = ctx.invocation;
        let name = required(ctx, 0, USAGE)?;
        let handler = required(ctx, 1, USAGE)?;
        let trigger: TriggerKind = invocation
            .kwarg("trigger")
            .or_else(|| invocation.arg(2))
            .unwrap_or("prefix")
            .parse()?;
        let raw_tier = invocation
            .kwarg("tier")
            .or_else(|| invocation.arg(3))
            .unwrap_or("0");
        let tier = raw_tier.trim().parse().map_err(|_| Error::InvalidArgument {
            message: format!("`{raw_tier}` is not a tier"),
        })?;
        let description = invocation
            .kwarg("description")
            .or_else(|| invocation.arg(4))
            .unwrap_or_default();

        let spec = CommandSpec::new(name, handler, trigger, tier, description);
        ctx.session.add_command(&spec).await?;
        Ok(CommandOutput::text(format!(
            "Command `{}` ({trigger}, tier {tier}) now runs `{}`.",
            spec.name.to_lowercase(),
            spec.handler
        )))
    }
}

/// Unregisters a command: `?removecommand <name>`.
pub struct RemoveCommand;

#[async_trait]
impl BotCommand for RemoveCommand {
    async fn run(&self, ctx: &CommandContext<'_>) -> Result<CommandOutput> {
        let name = ctx.invocation.rest();
        if name.trim().is_empty() {
            return Err(Error::InvalidArgument {
                message: format!("usage: {}removecommand <name>", ctx.session.settings().prefix),
            });
        }
        ctx.session.remove_command(name.trim()).await?;
        Ok(CommandOutput::text(format!(
            "Command `{}` removed.",
            name.trim().to_lowercase()
        )))
    }
}

/// Reloads the command table from the database.
pub struct Refresh;

#[async_trait]
impl BotCommand for Refresh {
    async fn run(&self, ctx: &CommandContext<'_>) -> Result<CommandOutput> {
        let count = ctx.session.refresh_commands().await?;
        Ok(CommandOutput::Log(format!(
            "user {} reloaded {count} commands",
            ctx.invocation.user_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::commands::builtin_handlers;
    use crate::core::{
        command_store,
        dispatcher::{self, DispatchOutcome, Rejection},
        session::Session,
    };
    use crate::test_utils::*;
    use std::sync::Arc;

    const ADMIN: UserId = 900;

    async fn seeded() -> Result<(Arc<Session>, Arc<RecordingMessenger>)> {
        let catalog = builtin_handlers();
        let defaults = catalog.defaults().to_vec();
        let (session, messenger) = test_session(catalog, test_settings()).await?;
        for spec in &defaults {
            session.add_command(spec).await?;
        }
        permissions::set_tier(session.db(), ADMIN, 4).await?;
        create_test_pokemon(session.db(), "Pikachu").await?;
        Ok((session, messenger))
    }

    #[test]
    fn test_parse_user_id() {
        assert_eq!(parse_user_id("123"), Some(123));
        assert_eq!(parse_user_id("<@123>"), Some(123));
        assert_eq!(parse_user_id(" <@!123> "), Some(123));
        assert_eq!(parse_user_id("bob"), None);
    }

    #[tokio::test]
    async fn test_addalias_then_lookup() -> Result<()> {
        let (session, messenger) = seeded().await?;

        dispatcher::dispatch(&session, &user_message(ADMIN, 10, "?addalias Sparky, pikachu")).await;
        dispatcher::dispatch(&session, &user_message(1, 10, "?pokemon sparky")).await;

        assert_eq!(messenger.sent_texts()[0], "`sparky` now refers to Pikachu.");
        assert_eq!(messenger.sent_embeds()[0].title, "Pikachu");
        Ok(())
    }

    #[tokio::test]
    async fn test_addalias_rejects_unknown_target() -> Result<()> {
        let (session, _messenger) = seeded().await?;
        let outcome =
            dispatcher::dispatch(&session, &user_message(ADMIN, 10, "?addalias x, missingno")).await;
        assert!(matches!(outcome, DispatchOutcome::Failed { kind: "InvalidArgument", .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_removealias() -> Result<()> {
        let (session, messenger) = seeded().await?;
        catalog::set_alias(session.db(), "pika", "Pikachu").await?;

        dispatcher::dispatch(&session, &user_message(ADMIN, 10, "?removealias pika")).await;
        dispatcher::dispatch(&session, &user_message(ADMIN, 10, "?removealias pika")).await;

        assert_eq!(
            messenger.sent_texts(),
            vec!["Alias `pika` removed.", "There is no alias `pika`."]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_ordinary_users_cannot_run_admin_commands() -> Result<()> {
        let (session, messenger) = seeded().await?;

        let outcome = dispatcher::dispatch(&session, &user_message(1, 10, "?settier 1, 4")).await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Rejected(Rejection::Unauthorized { required: 3, tier: 1, .. })
        ));
        assert!(messenger.sent_texts()[0].starts_with("Restricted access"));
        assert_eq!(permissions::get_tier(session.db(), 1).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_settier_by_mention_and_by_id() -> Result<()> {
        let (session, messenger) = seeded().await?;
        let mut message = user_message(ADMIN, 10, "?settier <@5>, <@6>, 2");
        message.mentions = vec![5, 6];

        let outcome = dispatcher::dispatch(&session, &message).await;
        dispatcher::dispatch(&session, &user_message(ADMIN, 10, "?settier 7, tier=3")).await;

        assert!(matches!(outcome, DispatchOutcome::Done { .. }));
        assert_eq!(permissions::get_tier(session.db(), 5).await?, Some(2));
        assert_eq!(permissions::get_tier(session.db(), 6).await?, Some(2));
        assert_eq!(permissions::get_tier(session.db(), 7).await?, Some(3));
        assert!(messenger.sent().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_settier_cannot_exceed_own_tier() -> Result<()> {
        let (session, _messenger) = seeded().await?;
        permissions::set_tier(session.db(), 50, 3).await?;

        let outcome = dispatcher::dispatch(&session, &user_message(50, 10, "?settier 7, 4")).await;

        assert!(matches!(outcome, DispatchOutcome::Failed { .. }));
        assert_eq!(permissions::get_tier(session.db(), 7).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_addcommand_and_removecommand() -> Result<()> {
        let (session, messenger) = seeded().await?;

        dispatcher::dispatch(
            &session,
            &user_message(ADMIN, 10, "?addcommand hello there, goodbot, contain"),
        )
        .await;
        dispatcher::dispatch(&session, &user_message(1, 10, "well hello there bot")).await;
        dispatcher::dispatch(&session, &user_message(ADMIN, 10, "?removecommand hello there")).await;
        let after = dispatcher::dispatch(&session, &user_message(1, 10, "hello there")).await;

        let texts = messenger.sent_texts();
        assert!(texts[0].starts_with("Command `hello there` (contain, tier 0)"));
        assert_eq!(texts[1], crate::bot::commands::fun::THANKS);
        assert_eq!(after, DispatchOutcome::Rejected(Rejection::NotACommand));
        Ok(())
    }

    #[tokio::test]
    async fn test_addcommand_rejects_unknown_handler() -> Result<()> {
        let (session, _messenger) = seeded().await?;
        let outcome =
            dispatcher::dispatch(&session, &user_message(ADMIN, 10, "?addcommand x, nothing")).await;
        assert!(matches!(outcome, DispatchOutcome::Failed { kind: "HandlerNotFound", .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_picks_up_stored_commands() -> Result<()> {
        let (session, _messenger) = seeded().await?;
        command_store::save_command(
            session.db(),
            &CommandSpec::new("hey", "goodbot", TriggerKind::Match, 0, ""),
        )
        .await?;
        assert!(session.commands().await.lookup("hey").is_none());

        let outcome = dispatcher::dispatch(&session, &user_message(ADMIN, 10, "?refresh")).await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Done { output: CommandOutput::Log(_), .. }
        ));
        assert!(session.commands().await.find_match("hey").is_some());
        Ok(())
    }
}
