//! Review session management for spaced repetition practice.
//! Handles multi-round review of due items with SM-2 scheduling.

use super::{Quality, ReviewItem, sm2};
use crate::config::SchedulerConfig;
use chrono::{DateTime, Utc};

/// A card in the session: the item plus whether it passed in the current round.
#[derive(Clone, Debug)]
struct SessionCard {
    item: ReviewItem,
    passed: bool,
}

/// Manages a review session with multiple rounds.
/// Items that aren't remembered are repeated in subsequent rounds.
pub struct ReviewSession {
    cards: Vec<SessionCard>,
    current_round: Vec<usize>,
    current_index: usize,
    round_number: usize,
    show_answer: bool,
    config: SchedulerConfig,
}

impl ReviewSession {
    /// Starts a session over `items` in the given order, usually
    /// `prioritize(&due_items(..), now)`.
    pub fn new(items: Vec<ReviewItem>, config: SchedulerConfig) -> Self {
        let cards: Vec<SessionCard> = items
            .into_iter()
            .map(|item| SessionCard {
                item,
                passed: false,
            })
            .collect();
        let current_round = (0..cards.len()).collect();

        Self {
            cards,
            current_round,
            current_index: 0,
            round_number: 1,
            show_answer: false,
            config,
        }
    }

    pub fn current_item(&self) -> Option<&ReviewItem> {
        self.current_round
            .get(self.current_index)
            .and_then(|&idx| self.cards.get(idx))
            .map(|card| &card.item)
    }

    pub fn show_answer(&self) -> bool {
        self.show_answer
    }

    pub fn toggle_answer(&mut self) {
        self.show_answer = !self.show_answer;
    }

    /// Grades the current card, reschedules it and moves on.
    /// Returns the updated item so the caller can persist it.
    ///
    /// Every grade is a full review: a card retried in a later round goes
    /// through the scheduler again, so a failure followed by a successful
    /// retry moves its interval from 1 to 6 days within the same sitting.
    pub fn grade_current(
        &mut self,
        remembered: bool,
        quality: Quality,
        now: DateTime<Utc>,
    ) -> Option<ReviewItem> {
        let idx = *self.current_round.get(self.current_index)?;
        let card = self.cards.get_mut(idx)?;

        card.item = sm2::schedule_next_review(&card.item, remembered, quality, now, &self.config);
        card.passed = remembered;
        let updated = card.item.clone();

        tracing::debug!(
            id = %updated.id,
            remembered,
            quality = quality.value(),
            interval = updated.interval,
            round = self.round_number,
            "Graded review item"
        );

        self.advance();
        Some(updated)
    }

    fn advance(&mut self) {
        self.show_answer = false;
        if self.current_index + 1 < self.current_round.len() {
            self.current_index += 1;
        } else {
            self.start_next_round();
        }
    }

    /// Starts a new round with the cards that were not remembered.
    /// If none remain, the session is complete.
    fn start_next_round(&mut self) {
        let failed: Vec<usize> = self
            .current_round
            .iter()
            .copied()
            .filter(|&idx| self.cards.get(idx).is_some_and(|card| !card.passed))
            .collect();

        if failed.is_empty() {
            self.current_index = self.current_round.len();
            return;
        }

        for &idx in &failed {
            if let Some(card) = self.cards.get_mut(idx) {
                card.passed = false;
            }
        }
        self.current_round = failed;
        self.current_index = 0;
        self.round_number += 1;
    }

    pub fn round_number(&self) -> usize {
        self.round_number
    }

    pub fn passed_count(&self) -> usize {
        self.current_round
            .iter()
            .filter(|&&idx| self.cards.get(idx).is_some_and(|card| card.passed))
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.passed_count()
    }

    /// True once a round ends with every card remembered, or there was nothing to review.
    pub fn is_completed(&self) -> bool {
        self.current_item().is_none()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} items", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (Retry): {} items to retry",
                self.round_number,
                self.total_count()
            )
        }
    }

    /// All items with their latest state, in the session's original order.
    pub fn items(&self) -> impl Iterator<Item = &ReviewItem> {
        self.cards.iter().map(|card| &card.item)
    }

    pub fn into_items(self) -> Vec<ReviewItem> {
        self.cards.into_iter().map(|card| card.item).collect()
    }
}
