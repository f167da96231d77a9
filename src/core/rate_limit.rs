//! Reply rate limiting.
//!
//! Cooldowns never stop a command from running; they only decide whether its reply is
//! delivered. A suppressed send changes no state. A delivered send stamps both the channel
//! and the user and is appended to the user's bounded sent-message history.

use crate::config::CooldownSettings;
use crate::core::messaging::{ChannelId, MessageId, UserId};
use crate::errors::Result;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::time::{Duration, Instant};

/// Why a reply was suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
    /// The channel received a reply too recently
    ChannelCooldown {
        /// Time left on the cooldown
        remaining: Duration,
    },
    /// The user received a reply too recently
    UserCooldown {
        /// Time left on the cooldown
        remaining: Duration,
    },
}

impl fmt::Display for Suppression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelCooldown { remaining } => {
                write!(f, "channel cooldown ({}ms left)", remaining.as_millis())
            }
            Self::UserCooldown { remaining } => {
                write!(f, "user cooldown ({}ms left)", remaining.as_millis())
            }
        }
    }
}

/// A delivered message, kept in the per-user history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRecord {
    /// Channel the message went to
    pub channel_id: ChannelId,
    /// Id returned by the messenger
    pub message_id: MessageId,
    /// One-line summary of the payload
    pub summary: String,
    /// Wall-clock send time
    pub sent_at: DateTime<Utc>,
}

/// Per-channel and per-user cooldown state.
#[derive(Debug, Default)]
pub struct RateLimiter {
    channel_cooldown: Duration,
    ignore_tier: i32,
    user_cooldowns: BTreeMap<i32, Duration>,
    history_size: usize,
    channel_last: HashMap<ChannelId, Instant>,
    user_last: HashMap<UserId, Instant>,
    sent: HashMap<UserId, VecDeque<SentRecord>>,
}

impl RateLimiter {
    /// Builds a limiter from settings.
    ///
    /// # Errors
    /// Returns a configuration error for invalid durations or tier keys.
    pub fn from_settings(settings: &CooldownSettings) -> Result<Self> {
        Ok(Self::new(
            settings.channel_cooldown()?,
            settings.ignore_tier,
            settings.user_cooldowns()?,
            settings.history_size,
        ))
    }

    /// Builds a limiter from explicit values.
    #[must_use]
    pub fn new(
        channel_cooldown: Duration,
        ignore_tier: i32,
        user_cooldowns: BTreeMap<i32, Duration>,
        history_size: usize,
    ) -> Self {
        Self {
            channel_cooldown,
            ignore_tier,
            user_cooldowns,
            history_size,
            ..Self::default()
        }
    }

    /// Cooldown applying to a user of `tier`: the value configured for the nearest tier at
    /// or below it, or zero when none is configured.
    #[must_use]
    pub fn user_cooldown_for(&self, tier: i32) -> Duration {
        self.user_cooldowns
            .range(0..=tier.max(0))
            .next_back()
            .map_or(Duration::ZERO, |(_, d)| *d)
    }

    /// Returns the reason a reply to `channel` for `user` must be suppressed, if any.
    #[must_use]
    pub fn check(&self, channel: ChannelId, user: UserId, tier: i32, now: Instant) -> Option<Suppression> {
        if tier < self.ignore_tier {
            if let Some(last) = self.channel_last.get(&channel) {
                let elapsed = now.saturating_duration_since(*last);
                if elapsed < self.channel_cooldown {
                    return Some(Suppression::ChannelCooldown {
                        remaining: self.channel_cooldown - elapsed,
                    });
                }
            }
        }

        let cooldown = self.user_cooldown_for(tier);
        if let Some(last) = self.user_last.get(&user) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < cooldown {
                return Some(Suppression::UserCooldown {
                    remaining: cooldown - elapsed,
                });
            }
        }

        None
    }

    /// Checks and, if allowed, stamps the channel and user in one step.
    ///
    /// # Errors
    /// Returns the suppression reason when the send must not happen.
    pub fn acquire(
        &mut self,
        channel: ChannelId,
        user: UserId,
        tier: i32,
        now: Instant,
    ) -> std::result::Result<(), Suppression> {
        if let Some(reason) = self.check(channel, user, tier, now) {
            return Err(reason);
        }
        self.channel_last.insert(channel, now);
        self.user_last.insert(user, now);
        Ok(())
    }

    /// Appends a delivered message to the user's history, dropping the oldest entries
    /// beyond the configured size.
    pub fn record_sent(&mut self, user: UserId, record: SentRecord) {
        let history = self.sent.entry(user).or_default();
        history.push_back(record);
        while history.len() > self.history_size {
            history.pop_front();
        }
    }

    /// Messages recently delivered for a user, oldest first.
    #[must_use]
    pub fn sent_history(&self, user: UserId) -> Vec<SentRecord> {
        self.sent
            .get(&user)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }
}
