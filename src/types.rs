//! Core types for the FSRS memory model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed decay exponent of the forgetting curve. `Card::retrievability`
/// uses this constant directly so the probe works without a scheduler.
const DECAY: f64 = -0.5;

/// Card lifecycle state.
///
/// `New -> Learning|Relearning -> Review`; `Relearning` is reached only
/// from `Review` on a lapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    New,
    Learning,
    Review,
    Relearning,
}

impl Default for State {
    fn default() -> Self {
        Self::New
    }
}

impl State {
    /// Convert to the ordinal encoding (0-3).
    pub fn to_value(self) -> u8 {
        match self {
            Self::New => 0,
            Self::Learning => 1,
            Self::Review => 2,
            Self::Relearning => 3,
        }
    }

    /// Create from the ordinal encoding.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::New),
            1 => Some(Self::Learning),
            2 => Some(Self::Review),
            3 => Some(Self::Relearning),
            _ => None,
        }
    }
}

/// Rating for a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    /// Convert to 4-point numeric value (1-4). The value feeds the model
    /// formulas directly, including weight-vector indexing.
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    /// Create from 4-point numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }
}

/// The persistent memory-model record for one flashcard.
///
/// Mutated exclusively through `Scheduler::repeat`, which operates on a
/// copy and never touches the input in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub due: DateTime<Utc>,
    pub stability: f64,
    pub difficulty: f64,
    pub elapsed_days: i64,
    pub scheduled_days: i64,
    pub reps: u32,
    pub lapses: u32,
    pub state: State,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_review: Option<DateTime<Utc>>,
}

impl Card {
    /// A fresh card: new state, zero stability/difficulty, due immediately.
    pub fn new() -> Self {
        Self {
            due: Utc::now(),
            stability: 0.0,
            difficulty: 0.0,
            elapsed_days: 0,
            scheduled_days: 0,
            reps: 0,
            lapses: 0,
            state: State::New,
            last_review: None,
        }
    }

    /// Predicted recall probability at `now`, or `None` for cards that are
    /// not yet in the review state.
    pub fn retrievability(&self, now: DateTime<Utc>) -> Option<f64> {
        if self.state != State::Review {
            return None;
        }
        let last_review = self.last_review?;
        let factor = 0.9_f64.powf(1.0 / DECAY) - 1.0;
        let elapsed_days = (now - last_review).num_days().max(0);
        Some((1.0 + factor * elapsed_days as f64 / self.stability).powf(DECAY))
    }
}

impl Default for Card {
    fn default() -> Self {
        Self::new()
    }
}

/// Model configuration: weight vector, retention target, interval cap.
///
/// `w` is positionally meaningful; the default is the 17-element FSRS
/// weight vector. Cloning deep-copies the weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub request_retention: f64,
    pub maximum_interval: i64,
    pub w: Vec<f64>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            request_retention: 0.9,
            maximum_interval: 36500,
            w: vec![
                0.4, 0.6, 2.4, 5.8, 4.93, 0.94, 0.86, 0.01, 1.49, 0.14, 0.94, 2.18, 0.05, 0.34,
                1.26, 0.29, 2.61,
            ],
        }
    }
}

/// Immutable record of one candidate transition. `state` is the state the
/// card was in before the update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewLog {
    pub rating: Rating,
    pub scheduled_days: i64,
    pub elapsed_days: i64,
    pub review: DateTime<Utc>,
    pub state: State,
}

/// A resulting card paired with the log of the transition that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingInfo {
    pub card: Card,
    pub review_log: ReviewLog,
}
