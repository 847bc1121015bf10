//! Selecting and ordering review items for presentation.

use super::ReviewItem;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Orders items so the most urgent and hardest come first:
/// overdue before not yet due, then lower ease factor, then shorter interval.
/// Items equal on all three keys keep no guaranteed order.
pub fn prioritize(items: &[ReviewItem], now: DateTime<Utc>) -> Vec<ReviewItem> {
    let mut ordered = items.to_vec();
    ordered.sort_by(|a, b| compare_priority(a, b, now));
    ordered
}

/// Returns exactly the items whose next review is at or before `now`.
pub fn due_items(items: &[ReviewItem], now: DateTime<Utc>) -> Vec<ReviewItem> {
    items.iter().filter(|item| item.is_due(now)).cloned().collect()
}

fn compare_priority(a: &ReviewItem, b: &ReviewItem, now: DateTime<Utc>) -> Ordering {
    // true sorts after false, so compare b against a to put overdue first
    b.is_due(now)
        .cmp(&a.is_due(now))
        .then_with(|| a.ease_factor.total_cmp(&b.ease_factor))
        .then_with(|| a.interval.cmp(&b.interval))
}
