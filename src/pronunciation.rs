//! Pronunciation scoring for speech practice.
//!
//! Compares the expected phrase with the speech-recognition transcript using the
//! Levenshtein edit distance over normalized text.

use crate::models::Quality;
use serde::Serialize;

pub const DEFAULT_THRESHOLD: f64 = 0.8;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PronunciationScore {
    /// 0.0 (nothing in common) to 1.0 (identical after normalization)
    pub similarity: f64,
    /// Similarity as a rounded percentage
    pub percentage: u8,
    pub accepted: bool,
    pub threshold: f64,
}

impl PronunciationScore {
    /// Maps the score onto a recall quality so speech attempts can feed the scheduler.
    pub fn quality(&self) -> Quality {
        let value = match self.percentage {
            95.. => 5,
            85.. => 4,
            _ if self.accepted => 3,
            50.. => 2,
            25.. => 1,
            _ => 0,
        };
        // Always within 0..=5
        Quality::new(value).unwrap_or(Quality::BLACKOUT)
    }
}

/// Number of single-character insertions, deletions or substitutions
/// needed to turn `a` into `b`.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two rolling rows of the edit-distance matrix
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Lowercases, drops punctuation and collapses whitespace.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Similarity of the normalized strings in `[0, 1]`.
pub fn similarity(expected: &str, spoken: &str) -> f64 {
    let expected = normalize(expected);
    let spoken = normalize(spoken);

    let max_len = expected.chars().count().max(spoken.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    1.0 - levenshtein_distance(&expected, &spoken) as f64 / max_len as f64
}

pub fn score_pronunciation(expected: &str, spoken: &str, threshold: f64) -> PronunciationScore {
    let similarity = similarity(expected, spoken);
    PronunciationScore {
        similarity,
        percentage: (similarity * 100.0).round() as u8,
        accepted: similarity >= threshold,
        threshold,
    }
}
