//! SM-2 (SuperMemo 2) review scheduling.
//!
//! Each item carries an ease factor (EF) that controls how fast its interval grows:
//! - Successful recall: interval goes 1 day → 6 days → previous interval × EF,
//!   and EF is adjusted by the quality of the recall
//! - Failed recall: interval drops back to 1 day, the streak is reset and EF
//!   loses a fixed penalty
//! - EF never falls below the configured floor (1.3 by default)
//! - Intervals never exceed the configured maximum (100 years by default)

use super::review_item::days;
use super::{Quality, ReviewItem};
use crate::config::SchedulerConfig;
use chrono::{DateTime, Utc};

/// Computes the next state of `item` after a review at `now`.
/// The input is left untouched; the caller owns persistence.
pub fn schedule_next_review(
    item: &ReviewItem,
    remembered: bool,
    quality: Quality,
    now: DateTime<Utc>,
    config: &SchedulerConfig,
) -> ReviewItem {
    let (interval, consecutive_correct, ease_factor) = if remembered {
        let max_interval = config.max_interval_days.max(1);
        let interval = match item.interval {
            0 => 1,
            1 => 6,
            // Uses the ease factor from before this review
            prior => (f64::from(prior) * item.ease_factor)
                .round()
                .min(f64::from(max_interval)) as u32,
        }
        .min(max_interval);

        let ease = item.ease_factor + ease_delta(quality);
        (
            interval,
            item.consecutive_correct + 1,
            ease.max(config.min_ease_factor),
        )
    } else {
        let ease = item.ease_factor - config.failure_penalty;
        (1, 0, ease.max(config.min_ease_factor))
    };

    // Only reachable for `now` near chrono's upper bound
    let next_review = now
        .checked_add_signed(days(interval))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    ReviewItem {
        last_reviewed: now,
        next_review,
        ease_factor,
        interval,
        consecutive_correct,
        ..item.clone()
    }
}

/// EF' - EF = 0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)
fn ease_delta(quality: Quality) -> f64 {
    let miss = f64::from(Quality::MAX - quality.value());
    0.1 - miss * (0.08 + miss * 0.02)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 8, 30, 0).unwrap()
    }

    fn item(interval: u32, ease_factor: f64, consecutive_correct: u32) -> ReviewItem {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        ReviewItem {
            id: "perro".to_string(),
            last_reviewed: created,
            next_review: created,
            ease_factor,
            interval,
            consecutive_correct,
        }
    }

    fn q(value: u8) -> Quality {
        Quality::new(value).unwrap()
    }

    #[test]
    fn test_first_success() {
        let config = SchedulerConfig::default();
        let next = schedule_next_review(&item(0, 2.5, 0), true, q(5), now(), &config);

        assert_eq!(next.interval, 1);
        assert_eq!(next.consecutive_correct, 1);
        assert!((next.ease_factor - 2.6).abs() < 1e-9);
    }

    #[test]
    fn test_second_success() {
        let config = SchedulerConfig::default();
        let first = schedule_next_review(&item(0, 2.5, 0), true, q(5), now(), &config);
        let second = schedule_next_review(&first, true, q(5), now(), &config);

        assert_eq!(second.interval, 6);
        assert_eq!(second.consecutive_correct, 2);
    }

    #[test]
    fn test_growth_uses_prior_ease() {
        let config = SchedulerConfig::default();
        let next = schedule_next_review(&item(6, 2.5, 2), true, q(5), now(), &config);
        assert_eq!(next.interval, 15);

        let next = schedule_next_review(&item(15, 2.6, 3), true, q(4), now(), &config);
        assert_eq!(next.interval, 39);
    }

    #[test]
    fn test_long_success_streak_is_capped() {
        let config = SchedulerConfig::default();
        let mut current = item(0, 2.5, 0);

        for review in 1..=50 {
            let next = schedule_next_review(
                &current,
                true,
                Quality::PERFECT,
                current.next_review,
                &config,
            );
            assert!(next.interval <= config.max_interval_days);
            assert!(next.interval >= current.interval);
            assert_eq!(next.consecutive_correct, review);
            assert_eq!(
                (next.next_review - next.last_reviewed).num_seconds(),
                i64::from(next.interval) * 86_400
            );
            current = next;
        }

        assert_eq!(current.interval, config.max_interval_days);
    }

    #[test]
    fn test_small_max_interval_caps_early_steps() {
        let config = SchedulerConfig {
            max_interval_days: 3,
            ..Default::default()
        };
        let second = schedule_next_review(&item(1, 2.5, 1), true, q(5), now(), &config);
        assert_eq!(second.interval, 3);

        let grown = schedule_next_review(&item(u32::MAX, 3.0, 9), true, q(5), now(), &config);
        assert_eq!(grown.interval, 3);
    }

    #[test]
    fn test_due_date_never_overflows() {
        let config = SchedulerConfig::default();
        let late = DateTime::<Utc>::MAX_UTC - chrono::Duration::days(10);
        let next = schedule_next_review(&item(30_000, 2.5, 8), true, q(5), late, &config);

        assert_eq!(next.interval, config.max_interval_days);
        assert_eq!(next.next_review, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_failure_resets() {
        let config = SchedulerConfig::default();
        let next = schedule_next_review(&item(6, 2.5, 4), false, q(1), now(), &config);

        assert_eq!(next.interval, 1);
        assert_eq!(next.consecutive_correct, 0);
        assert!((next.ease_factor - 2.3).abs() < 1e-9);
    }

    #[test]
    fn test_failure_ignores_quality() {
        let config = SchedulerConfig::default();
        let low = schedule_next_review(&item(10, 2.0, 3), false, q(0), now(), &config);
        let high = schedule_next_review(&item(10, 2.0, 3), false, q(5), now(), &config);
        assert_eq!(low, high);
    }

    #[test]
    fn test_low_quality_success_lowers_ease() {
        let config = SchedulerConfig::default();
        let next = schedule_next_review(&item(1, 2.5, 1), true, q(3), now(), &config);
        assert!((next.ease_factor - 2.36).abs() < 1e-9);

        let next = schedule_next_review(&item(1, 2.5, 1), true, q(0), now(), &config);
        assert!((next.ease_factor - 1.7).abs() < 1e-9);
        assert_eq!(next.consecutive_correct, 2);
    }

    #[test]
    fn test_quality_four_keeps_ease() {
        let config = SchedulerConfig::default();
        let next = schedule_next_review(&item(1, 2.5, 1), true, q(4), now(), &config);
        assert!((next.ease_factor - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_ease_floor_after_repeated_failures() {
        let config = SchedulerConfig::default();
        let mut current = item(20, 2.5, 7);
        for _ in 0..20 {
            current = schedule_next_review(&current, false, q(0), now(), &config);
            assert!(current.ease_factor >= config.min_ease_factor);
        }
        assert_eq!(current.ease_factor, config.min_ease_factor);

        let next = schedule_next_review(&current, true, q(0), now(), &config);
        assert_eq!(next.ease_factor, config.min_ease_factor);
    }

    #[test]
    fn test_custom_penalty_and_floor() {
        let config = SchedulerConfig {
            min_ease_factor: 2.0,
            failure_penalty: 0.5,
            ..Default::default()
        };
        let next = schedule_next_review(&item(3, 2.3, 1), false, q(2), now(), &config);
        assert_eq!(next.ease_factor, 2.0);
    }

    #[test]
    fn test_due_date_follows_interval() {
        let config = SchedulerConfig::default();
        let cases = [(item(0, 2.5, 0), true), (item(6, 2.5, 2), true), (item(6, 2.5, 2), false)];

        for (before, remembered) in cases {
            let after = schedule_next_review(&before, remembered, q(4), now(), &config);
            assert_eq!(after.last_reviewed, now());
            assert_eq!(
                (after.next_review - after.last_reviewed).num_seconds(),
                i64::from(after.interval) * 86_400
            );
        }
    }

    #[test]
    fn test_input_is_unchanged_and_id_kept() {
        let config = SchedulerConfig::default();
        let before = item(6, 2.5, 2);
        let snapshot = before.clone();
        let after = schedule_next_review(&before, true, q(5), now(), &config);

        assert_eq!(before, snapshot);
        assert_eq!(after.id, before.id);
    }
}
