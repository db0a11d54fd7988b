//! Core FSRS scheduling library.
//!
//! Provides:
//! - Memory-model types (Card, State, Rating, Parameters)
//! - The four-branch review scheduler (`Scheduler::repeat`)
//! - Review log / scheduling info value objects
//!
//! `Scheduler::repeat` takes a card and a review timestamp and returns one
//! candidate next state per rating; the caller picks the entry matching the
//! rating the user actually gave and persists that card.

pub mod card_scheduler;
pub mod error;
pub mod scheduler;
pub mod types;

pub use card_scheduler::CardScheduler;
pub use error::{FsrsError, Result};
pub use scheduler::Scheduler;
pub use types::{Card, Parameters, Rating, ReviewLog, SchedulingInfo, State};
