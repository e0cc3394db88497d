//! Satellite telemetry math utilities.

pub mod math;

pub use math::correlation::*;
pub use math::descriptive::*;
pub use math::polyfit::*;
