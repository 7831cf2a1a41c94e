//! Constants module for integration and frame calculations

// Gauss-Jackson order settings
/// Default maximum order allocated for a Gauss-Jackson coefficient table
pub const DEFAULT_GJ_MAX_ORDER: usize = 12;
/// Default working order of a Gauss-Jackson integrator
pub const DEFAULT_GJ_ORDER: usize = 8;
/// Largest order accepted from configuration
///
/// Beyond this the ordinate-form coefficients grow large enough that the
/// weighted history sums lose more precision than the higher order gains.
pub const GJ_ORDER_LIMIT: usize = 30;
