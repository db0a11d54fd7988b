//! Error types for fsrs-core.

use thiserror::Error;

/// Result type alias using FsrsError.
pub type Result<T> = std::result::Result<T, FsrsError>;

/// Errors that can occur during scheduling.
#[derive(Debug, Error)]
pub enum FsrsError {
    /// The review timestamp handed to `Scheduler::repeat` must be
    /// timezone-aware UTC. The call aborts before the card is touched.
    #[error("review timestamp must be timezone-aware UTC")]
    InvalidReviewTimestamp,
}
