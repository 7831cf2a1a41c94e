//! Error types for the integration module
//!
//! Coefficient generation only runs while an integrator is being configured,
//! so every variant here points at a setup mistake rather than bad runtime data.

use thiserror::Error;

/// Main error type for Gauss-Jackson coefficient generation
#[derive(Error, Debug)]
pub enum CoefficientError {
    /// A rational coefficient series was requested with an unusable length
    #[error("Invalid coefficient series size: {size}")]
    InvalidSize {
        /// The requested number of terms
        size: usize,
    },

    /// The requested corrector order does not fit the allocated table
    #[error("Order {order} exceeds the configured maximum order {max_order}")]
    OrderExceedsCapacity {
        /// The requested order
        order: usize,
        /// The capacity the table was configured with
        max_order: usize,
    },

    /// Coefficients were requested from a table that was never configured
    #[error("Coefficient table has not been configured")]
    NotConfigured,

    /// Configuration values are inconsistent
    #[error("Invalid integrator configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be parsed
    #[error("Configuration parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Extension of the Result type for coefficient operations
pub type Result<T> = std::result::Result<T, CoefficientError>;
