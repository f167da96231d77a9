//! Bot settings loaded from `config.toml`.
//!
//! Every field has a default so a partial (or missing) file still yields a usable
//! configuration. Durations are written in seconds and converted on access.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Top-level bot settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    /// Command prefix, e.g. `?`
    pub prefix: String,
    /// Parameter delimiter for prefixed commands
    pub delimiter: String,
    /// Tier assumed for users without a stored tier
    pub default_tier: i32,
    /// Highest tier; users at this tier bypass restricted mode
    pub max_tier: i32,
    /// When set, only whitelisted channels are served to non-max-tier users
    pub restricted_mode: bool,
    /// Channels served while in restricted mode
    pub whitelisted_channels: HashSet<u64>,
    /// Reply cooldowns
    pub cooldown: CooldownSettings,
    /// Interactive choice prompts
    pub choice: ChoiceSettings,
    /// Name lookup and query history
    pub lookup: LookupSettings,
}

/// Channel and user reply cooldowns.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CooldownSettings {
    /// Minimum seconds between two replies in one channel
    pub channel_secs: f64,
    /// Users at or above this tier ignore the channel cooldown
    pub ignore_tier: i32,
    /// Per-tier user cooldown in seconds, keyed by tier
    pub user_secs: BTreeMap<String, f64>,
    /// Number of sent messages remembered per user
    pub history_size: usize,
}

/// Interactive choice prompt settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChoiceSettings {
    /// Seconds to wait for a selection
    pub timeout_secs: f64,
    /// Maximum number of options offered (never more than nine)
    pub max_choices: usize,
}

/// Name lookup settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LookupSettings {
    /// Minimum similarity in `[0, 1]` for a fuzzy suggestion
    pub cutoff: f64,
    /// Maximum number of fuzzy suggestions
    pub max_suggestions: usize,
    /// Number of queries remembered per user
    pub query_history_size: usize,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            prefix: "?".to_string(),
            delimiter: ",".to_string(),
            default_tier: 1,
            max_tier: 4,
            restricted_mode: false,
            whitelisted_channels: HashSet::new(),
            cooldown: CooldownSettings::default(),
            choice: ChoiceSettings::default(),
            lookup: LookupSettings::default(),
        }
    }
}

impl Default for CooldownSettings {
    fn default() -> Self {
        Self {
            channel_secs: 1.0,
            ignore_tier: 3,
            user_secs: BTreeMap::from([("0".to_string(), 5.0), ("1".to_string(), 1.0)]),
            history_size: 10,
        }
    }
}

impl Default for ChoiceSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30.0,
            max_choices: 9,
        }
    }
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            cutoff: 0.6,
            max_suggestions: 5,
            query_history_size: 10,
        }
    }
}

fn seconds(field: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|e| Error::Config {
        message: format!("`{field}` must be a finite, non-negative number of seconds: {e}"),
    })
}

impl CooldownSettings {
    /// Channel cooldown as a [`Duration`].
    pub fn channel_cooldown(&self) -> Result<Duration> {
        seconds("cooldown.channel_secs", self.channel_secs)
    }

    /// Per-tier user cooldowns with parsed tier keys.
    pub fn user_cooldowns(&self) -> Result<BTreeMap<i32, Duration>> {
        self.user_secs
            .iter()
            .map(|(tier, secs)| {
                let tier = tier.trim().parse::<i32>().map_err(|e| Error::Config {
                    message: format!("cooldown.user_secs key '{tier}' is not a tier: {e}"),
                })?;
                Ok((tier, seconds("cooldown.user_secs", *secs)?))
            })
            .collect()
    }
}

impl ChoiceSettings {
    /// Selection timeout as a [`Duration`].
    pub fn timeout(&self) -> Result<Duration> {
        seconds("choice.timeout_secs", self.timeout_secs)
    }
}

impl BotSettings {
    /// Checks the settings for values that would break dispatching.
    ///
    /// # Errors
    /// Returns [`Error::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() {
            return Err(Error::Config {
                message: "`prefix` cannot be empty".to_string(),
            });
        }
        if self.delimiter.is_empty() {
            return Err(Error::Config {
                message: "`delimiter` cannot be empty".to_string(),
            });
        }
        if self.default_tier < 0 || self.max_tier < self.default_tier {
            return Err(Error::Config {
                message: format!(
                    "tiers must satisfy 0 <= default_tier ({}) <= max_tier ({})",
                    self.default_tier, self.max_tier
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.lookup.cutoff) {
            return Err(Error::Config {
                message: format!("`lookup.cutoff` must be in [0, 1], got {}", self.lookup.cutoff),
            });
        }
        if self.choice.max_choices == 0 {
            return Err(Error::Config {
                message: "`choice.max_choices` must be at least 1".to_string(),
            });
        }
        self.cooldown.channel_cooldown()?;
        self.cooldown.user_cooldowns()?;
        self.choice.timeout()?;
        Ok(())
    }
}

/// Loads and validates settings from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read, is not valid TOML, or fails validation.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<BotSettings> {
    let path_ref = path.as_ref();
    debug!("Loading settings from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read settings file {path_ref:?}: {e}"),
    })?;
    let settings: BotSettings = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse settings file {path_ref:?}: {e}"),
    })?;
    settings.validate()?;
    Ok(settings)
}

/// Loads settings from `SHUFFLE_BUDDY_CONFIG` (default `./config.toml`), falling back to
/// defaults when the file does not exist.
pub fn load_default_settings() -> Result<BotSettings> {
    let path = std::env::var("SHUFFLE_BUDDY_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        load_settings(&path)
    } else {
        info!("No settings file at {}, using defaults", path);
        Ok(BotSettings::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_partial_settings() {
        let toml_str = r#"
            prefix = "!"
            restricted_mode = true
            whitelisted_channels = [10, 20]

            [cooldown]
            channel_secs = 2.5
            ignore_tier = 2

            [cooldown.user_secs]
            0 = 10.0
            3 = 0.5

            [lookup]
            cutoff = 0.75
        "#;

        let settings: BotSettings = toml::from_str(toml_str).unwrap();
        settings.validate().unwrap();
        assert_eq!(settings.prefix, "!");
        assert_eq!(settings.delimiter, ",");
        assert!(settings.restricted_mode);
        assert!(settings.whitelisted_channels.contains(&20));
        assert_eq!(
            settings.cooldown.channel_cooldown().unwrap(),
            Duration::from_millis(2500)
        );
        let users = settings.cooldown.user_cooldowns().unwrap();
        assert_eq!(users.get(&0), Some(&Duration::from_secs(10)));
        assert_eq!(users.get(&3), Some(&Duration::from_millis(500)));
        assert_eq!(settings.lookup.cutoff, 0.75);
        assert_eq!(settings.lookup.max_suggestions, 5);
        assert_eq!(settings.choice.max_choices, 9);
    }

    #[test]
    fn test_defaults_are_valid() {
        BotSettings::default().validate().unwrap();
    }

    #[test]
    fn test_rejects_bad_tier_key() {
        let mut settings = BotSettings::default();
        settings
            .cooldown
            .user_secs
            .insert("admin".to_string(), 1.0);
        assert!(matches!(settings.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_rejects_negative_cooldown_and_empty_prefix() {
        let mut settings = BotSettings::default();
        settings.cooldown.channel_secs = -1.0;
        assert!(settings.validate().is_err());

        let settings = BotSettings {
            prefix: String::new(),
            ..BotSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
