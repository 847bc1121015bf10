//! Aggregate progress figures over a collection of review items.

use super::ReviewItem;
use crate::config::SchedulerConfig;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_count: usize,
    pub due_count: usize,
    pub mastered_count: usize,
    /// Due after `now` but inside the upcoming window; excludes already-due items.
    pub upcoming_count: usize,
    pub average_ease_factor: f64,
    pub mastery_percentage: f64,
}

/// Computes statistics at `now`. An empty collection yields all zeros.
pub fn review_stats(
    items: &[ReviewItem],
    now: DateTime<Utc>,
    config: &SchedulerConfig,
) -> ReviewStats {
    if items.is_empty() {
        return ReviewStats::default();
    }

    let window_end = now + Duration::hours(i64::from(config.upcoming_window_hours));
    let total_count = items.len();

    let due_count = items.iter().filter(|item| item.is_due(now)).count();
    let mastered_count = items.iter().filter(|item| item.is_mastered(config)).count();
    let upcoming_count = items
        .iter()
        .filter(|item| item.next_review > now && item.next_review < window_end)
        .count();
    let ease_sum: f64 = items.iter().map(|item| item.ease_factor).sum();

    ReviewStats {
        total_count,
        due_count,
        mastered_count,
        upcoming_count,
        average_ease_factor: ease_sum / total_count as f64,
        mastery_percentage: mastered_count as f64 / total_count as f64 * 100.0,
    }
}
