//! Error types for the framelib module

use thiserror::Error;

/// Errors raised while building or walking a frame tree
///
/// A frame tree with a broken relationship cannot be partially walked, so the
/// walker reports these and produces no state at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Two frames do not have the relationship an operation needs
    #[error("Invalid frame relationship between '{subject}' and '{target}': {reason}")]
    InvalidNode {
        /// Frame whose state was requested
        subject: String,
        /// Frame the state was requested relative to
        target: String,
        /// What is wrong with the pair
        reason: String,
    },

    /// A frame id that does not belong to this tree
    #[error("Unknown frame id {0}")]
    UnknownFrame(usize),

    /// A frame name that is already taken
    #[error("Duplicate frame name: {0}")]
    DuplicateName(String),
}

/// Extension of the Result type for frame operations
pub type Result<T> = std::result::Result<T, FrameError>;
