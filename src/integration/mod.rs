//! Gauss-Jackson integration coefficients
//!
//! This module derives the coefficients used by a variable-order
//! Gauss-Jackson (second-order systems) / summed-Adams (first-order systems)
//! predictor-corrector integrator, and applies them to a derivative history.
//!
//! # Main Components
//!
//! - `rational`: exact rational Adams and Stormer-Cowell series
//! - `coeffs`: coefficient pairs, the predictor/corrector table, and the
//!   application kernel
//! - `config`: serde-backed order configuration
//! - Error types for coefficient generation

pub mod coeffs;
pub mod config;
pub mod errors;
pub mod rational;

pub use self::coeffs::{CoefficientPair, CoefficientTable};
pub use self::config::GaussJacksonConfig;
pub use self::errors::CoefficientError;
pub use self::rational::RationalCoefficients;
