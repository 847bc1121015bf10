//! Scheduler tuning knobs, optionally loaded from a JSON file.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerConfig {
    /// Floor for the ease factor.
    #[serde(default = "default_min_ease_factor")]
    pub min_ease_factor: f64,

    /// Ease factor given to newly created items.
    #[serde(default = "default_initial_ease_factor")]
    pub initial_ease_factor: f64,

    /// Ease lost on a failed recall.
    #[serde(default = "default_failure_penalty")]
    pub failure_penalty: f64,

    /// Consecutive correct recalls needed to count an item as mastered.
    #[serde(default = "default_mastery_threshold")]
    pub mastery_threshold: u32,

    #[serde(default = "default_upcoming_window_hours")]
    pub upcoming_window_hours: u32,

    /// Longest interval the scheduler will hand out, in days.
    #[serde(default = "default_max_interval_days")]
    pub max_interval_days: u32,
}

fn default_min_ease_factor() -> f64 {
    1.3
}

fn default_initial_ease_factor() -> f64 {
    2.5
}

fn default_failure_penalty() -> f64 {
    0.2
}

fn default_mastery_threshold() -> u32 {
    5
}

fn default_upcoming_window_hours() -> u32 {
    24
}

fn default_max_interval_days() -> u32 {
    36_500
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_ease_factor: default_min_ease_factor(),
            initial_ease_factor: default_initial_ease_factor(),
            failure_penalty: default_failure_penalty(),
            mastery_threshold: default_mastery_threshold(),
            upcoming_window_hours: default_upcoming_window_hours(),
            max_interval_days: default_max_interval_days(),
        }
    }
}

impl SchedulerConfig {
    /// Loads the config from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: SchedulerConfig = serde_json::from_str(&contents)?;
        config.validate()?;

        tracing::debug!(path = %path.display(), "Loaded scheduler config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_ease_factor.is_nan() || self.min_ease_factor <= 0.0 {
            return Err(Error::Config(format!(
                "minEaseFactor must be positive, got {}",
                self.min_ease_factor
            )));
        }
        if self.initial_ease_factor < self.min_ease_factor {
            return Err(Error::Config(format!(
                "initialEaseFactor {} is below minEaseFactor {}",
                self.initial_ease_factor, self.min_ease_factor
            )));
        }
        if self.max_interval_days == 0 {
            return Err(Error::Config("maxIntervalDays must be at least 1".to_string()));
        }
        if self.failure_penalty < 0.0 {
            return Err(Error::Config(format!(
                "failurePenalty must not be negative, got {}",
                self.failure_penalty
            )));
        }
        Ok(())
    }
}
