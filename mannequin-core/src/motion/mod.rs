//! Motion control
//!
//! Endstop tracking and the motor speed ramp.

pub mod limits;
pub mod ramp;

pub use limits::{Endstop, EndstopLevels, LimitBelief, LimitSnapshot, LimitTracker};
pub use ramp::{MotorEvent, MotorRamp, RampStage};
