//! Deterministic pose simulation over the routine graph's movement nodes.

pub mod deriver;

pub use deriver::*;

/// Side length of the square field, in inches.
pub const FIELD_SIZE_IN: f64 = 144.0;

/// Default travel distance when a movement node leaves it unset.
pub const DEFAULT_DISTANCE_IN: f64 = 24.0;
/// Default turn angle in degrees.
pub const DEFAULT_ANGLE_DEG: f64 = 90.0;
/// Default wait/action duration in seconds.
pub const DEFAULT_DURATION_S: f64 = 1.0;
/// Default motor power.
pub const DEFAULT_POWER: f64 = 0.5;
