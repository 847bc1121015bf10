//! Review state of one learnable unit (a word, phrase or sentence).
use crate::config::SchedulerConfig;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub id: String,
    pub last_reviewed: DateTime<Utc>,
    pub next_review: DateTime<Utc>,
    pub ease_factor: f64,
    /// Days until the next review. 0 means never successfully reviewed.
    pub interval: u32,
    pub consecutive_correct: u32,
}

impl ReviewItem {
    /// Creates a never-reviewed item that is due immediately.
    pub fn new(id: impl Into<String>, now: DateTime<Utc>, config: &SchedulerConfig) -> Self {
        Self {
            id: id.into(),
            last_reviewed: now,
            next_review: now,
            ease_factor: config.initial_ease_factor,
            interval: 0,
            consecutive_correct: 0,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }

    pub fn is_mastered(&self, config: &SchedulerConfig) -> bool {
        self.consecutive_correct >= config.mastery_threshold
    }

    /// True when `next_review` is exactly `interval` days after `last_reviewed`.
    pub fn has_consistent_due_date(&self) -> bool {
        self.last_reviewed.checked_add_signed(days(self.interval)) == Some(self.next_review)
    }
}

/// Whole days as a fixed number of seconds, avoiding calendar arithmetic.
pub(crate) fn days(interval: u32) -> Duration {
    Duration::seconds(i64::from(interval) * 86_400)
}
