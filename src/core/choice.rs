//! Interactive choice protocol.
//!
//! A prompt lists up to nine numbered candidates and carries one keycap marker per
//! candidate plus the cancel marker at position 0. Selection events published by the
//! transport land on a [`SelectionHub`]; [`await_selection`] filters them for one prompt
//! and one user and gives up after a timeout.

use crate::core::messaging::{MessageId, UserId};
use std::fmt::Write as _;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Keycap markers; index is the marker's position, position 0 cancels.
pub const MARKERS: [&str; 10] = [
    "0\u{fe0f}\u{20e3}",
    "1\u{fe0f}\u{20e3}",
    "2\u{fe0f}\u{20e3}",
    "3\u{fe0f}\u{20e3}",
    "4\u{fe0f}\u{20e3}",
    "5\u{fe0f}\u{20e3}",
    "6\u{fe0f}\u{20e3}",
    "7\u{fe0f}\u{20e3}",
    "8\u{fe0f}\u{20e3}",
    "9\u{fe0f}\u{20e3}",
];

/// Hard limit on candidates: one decimal digit per choice.
pub const MAX_CANDIDATES: usize = 9;

const HUB_CAPACITY: usize = 256;

/// A marker selected on a message by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEvent {
    /// Message the marker was selected on
    pub message_id: MessageId,
    /// User who selected it
    pub user_id: UserId,
    /// The marker, as rendered by the platform
    pub marker: String,
}

/// Terminal state of one choice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceOutcome {
    /// Index into the candidate list
    Selected(usize),
    /// The user picked the cancel marker
    Cancelled,
    /// Nobody picked anything in time
    TimedOut,
}

impl ChoiceOutcome {
    /// The selected index; cancellation and timeout both read as `None`.
    #[must_use]
    pub const fn selected(self) -> Option<usize> {
        match self {
            Self::Selected(index) => Some(index),
            Self::Cancelled | Self::TimedOut => None,
        }
    }
}

/// Fan-out of selection events to every waiting choice session.
#[derive(Debug, Clone)]
pub struct SelectionHub {
    sender: broadcast::Sender<SelectionEvent>,
}

impl Default for SelectionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionHub {
    /// Creates a hub with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(HUB_CAPACITY);
        Self { sender }
    }

    /// Publishes an event; events with no waiting session are dropped.
    pub fn publish(&self, event: SelectionEvent) {
        trace!(?event, "Publishing selection event");
        // An error only means nobody is waiting
        let _ = self.sender.send(event);
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SelectionEvent> {
        self.sender.subscribe()
    }
}

/// Number of candidates actually offered for `available` candidates.
#[must_use]
pub fn capped_len(available: usize, configured_max: usize) -> usize {
    available.min(MAX_CANDIDATES).min(configured_max)
}

/// Markers attached to a prompt with `count` candidates, cancel marker first.
#[must_use]
pub fn markers_for(count: usize) -> Vec<&'static str> {
    MARKERS[..=count.min(MAX_CANDIDATES)].to_vec()
}

fn without_variation_selector(marker: &str) -> String {
    marker.chars().filter(|c| *c != '\u{fe0f}').collect()
}

/// Position of a marker, if it is one of the first `count + 1` markers.
///
/// Platforms differ on whether keycaps carry the emoji variation selector, so it is
/// ignored when comparing.
#[must_use]
pub fn marker_position(marker: &str, count: usize) -> Option<usize> {
    let wanted = without_variation_selector(marker);
    MARKERS[..=count.min(MAX_CANDIDATES)]
        .iter()
        .position(|m| without_variation_selector(m) == wanted)
}

/// Renders the prompt text: a header line followed by one numbered line per candidate.
#[must_use]
pub fn render_prompt(header: &str, labels: &[String]) -> String {
    let mut text = String::from(header);
    for (i, label) in labels.iter().enumerate() {
        let _ = write!(text, "\n{} {label}", MARKERS[i + 1]);
    }
    let _ = write!(text, "\n{} cancel", MARKERS[0]);
    text
}

/// Waits for `user` to pick one of `count` candidates on `prompt`.
///
/// Events for other messages, other users or unattached markers are ignored. A closed
/// hub reads as a timeout.
pub async fn await_selection(
    events: &mut broadcast::Receiver<SelectionEvent>,
    prompt: MessageId,
    user: UserId,
    count: usize,
    timeout: Duration,
) -> ChoiceOutcome {
    let wait = async {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if event.message_id != prompt || event.user_id != user {
                        continue;
                    }
                    match marker_position(&event.marker, count) {
                        Some(0) => return ChoiceOutcome::Cancelled,
                        Some(position) => return ChoiceOutcome::Selected(position - 1),
                        None => {
                            debug!(marker = %event.marker, "Ignoring unattached marker");
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Selection listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return ChoiceOutcome::TimedOut,
            }
        }
    };

    tokio::time::timeout(timeout, wait)
        .await
        .unwrap_or(ChoiceOutcome::TimedOut)
}
