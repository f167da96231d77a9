//! Owner configuration loaded from environment variables.
//!
//! `BOT_OWNER_IDS` holds a comma-separated list of Discord user ids. Owners are given the
//! maximum tier at startup so that a fresh database can still be administered.

use tracing::warn;

/// Parses a comma-separated list of user ids, skipping blanks and logging bad entries.
#[must_use]
pub fn parse_owner_ids(raw: &str) -> Vec<u64> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<u64>() {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Ignoring invalid owner id '{}': {}", s, e);
                None
            }
        })
        .collect()
}

/// Gets the configured owner ids, or an empty list when `BOT_OWNER_IDS` is unset.
#[must_use]
pub fn get_owner_ids() -> Vec<u64> {
    std::env::var("BOT_OWNER_IDS")
        .map(|raw| parse_owner_ids(&raw))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_owner_ids_skips_blanks_and_garbage() {
        assert_eq!(
            parse_owner_ids(" 123, ,456,not-an-id,789 "),
            vec![123, 456, 789]
        );
    }

    #[test]
    fn test_parse_owner_ids_empty() {
        assert!(parse_owner_ids("").is_empty());
    }
}
