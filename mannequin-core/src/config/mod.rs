//! Configuration types
//!
//! Timing and level constants for the motor ramp, the target phases, and
//! fault detection. Values are fixed at compile time.

pub mod types;

pub use types::*;
