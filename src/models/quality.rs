//! Recall quality rating on the SM-2 scale.
//!
//! - 0: complete blackout
//! - 1: incorrect, but the answer was recognised
//! - 2: incorrect, but the answer seemed easy once shown
//! - 3: correct with serious difficulty
//! - 4: correct after hesitation
//! - 5: perfect, effortless recall

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const MAX: u8 = 5;
    pub const BLACKOUT: Quality = Quality(0);
    pub const PERFECT: Quality = Quality(5);

    /// Rejects ratings above 5 instead of clamping them.
    pub fn new(value: u8) -> Result<Self> {
        if value > Self::MAX {
            return Err(Error::InvalidQuality(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Ratings of 3 and above count as a successful recall.
    pub fn is_passing(self) -> bool {
        self.0 >= 3
    }
}

impl TryFrom<u8> for Quality {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> u8 {
        quality.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
