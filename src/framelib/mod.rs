//! Reference frame states and frame trees
//!
//! # Main Components
//!
//! - `state`: the kinematic state of one frame relative to another and the
//!   composition algebra used to chain states together
//! - `tree`: an arena of frames linked into trees, and the walker that
//!   derives the state of any frame relative to any other in the same tree
//! - Error types for frame operations

pub mod errors;
pub mod state;
pub mod tree;

pub use self::errors::FrameError;
pub use self::state::{KinematicState, RotationalState, TranslationalState};
pub use self::tree::{FrameId, FrameTree, StateExpression};
