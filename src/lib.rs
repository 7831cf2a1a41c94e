//! Astrodyn: numerical cores for trajectory simulation
//!
//! This crate provides the coefficient engine of a variable-order
//! Gauss-Jackson predictor-corrector integrator and the state algebra used to
//! relate reference frames arranged in a tree.
//!
//! # Integration coefficients
//!
//! ```rust
//! use astrodyn::integration::CoefficientTable;
//!
//! let mut table = CoefficientTable::with_max_order(12);
//! table.compute_coeffs(8)?;
//!
//! // One acceleration sample per coefficient, oldest first
//! let history = vec![[0.0, 0.0, -9.8]; table.predictor().len()];
//! let mut vel_sum = [0.0; 3];
//! let mut pos_sum = [0.0; 3];
//! table.predictor().apply_two_state(&history, &mut vel_sum, &mut pos_sum);
//! # Ok::<(), astrodyn::AstrodynError>(())
//! ```
//!
//! # Frame states
//!
//! ```rust
//! use astrodyn::framelib::{FrameTree, KinematicState};
//! use nalgebra::Vector3;
//!
//! let mut tree = FrameTree::new();
//! let root = tree.add_root("inertial")?;
//! let ship = tree.add_child(
//!     root,
//!     "ship",
//!     KinematicState::from_translation(Vector3::new(7000.0, 0.0, 0.0), Vector3::zeros()),
//! )?;
//! let probe = tree.add_child(
//!     root,
//!     "probe",
//!     KinematicState::from_translation(Vector3::new(7000.0, 10.0, 0.0), Vector3::zeros()),
//! )?;
//!
//! let rel = tree.compute_relative_state(probe, ship)?;
//! assert_eq!(rel.trans.position, Vector3::new(0.0, 10.0, 0.0));
//! # Ok::<(), astrodyn::AstrodynError>(())
//! ```

use thiserror::Error;

pub mod constants;
pub mod framelib;
pub mod integration;

// Re-export commonly used types
pub use framelib::{FrameId, FrameTree, KinematicState, StateExpression};
pub use integration::{CoefficientPair, CoefficientTable, GaussJacksonConfig};

/// Main error type for the astrodyn library
#[derive(Debug, Error)]
pub enum AstrodynError {
    #[error("Coefficient error: {0}")]
    Coefficient(#[from] integration::CoefficientError),

    #[error("Frame error: {0}")]
    Frame(#[from] framelib::FrameError),
}

/// Result type for astrodyn operations
pub type Result<T> = std::result::Result<T, AstrodynError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_convert() {
        fn configure() -> Result<CoefficientTable> {
            let mut table = CoefficientTable::default();
            table.compute_coeffs(3)?;
            Ok(table)
        }

        let err = configure().unwrap_err();
        assert!(matches!(err, AstrodynError::Coefficient(_)));
        assert_eq!(
            err.to_string(),
            "Coefficient error: Coefficient table has not been configured"
        );
    }

    #[test]
    fn test_frame_error_converts() {
        fn walk() -> Result<KinematicState> {
            let mut tree = FrameTree::new();
            let a = tree.add_root("a")?;
            let b = tree.add_root("b")?;
            Ok(tree.compute_relative_state(a, b)?)
        }

        match walk().unwrap_err() {
            AstrodynError::Frame(framelib::FrameError::InvalidNode {
                subject, target, ..
            }) => {
                assert_eq!(subject, "a");
                assert_eq!(target, "b");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
