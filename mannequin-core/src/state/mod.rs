//! Target phase sequencing
//!
//! The coordinator owns the phase cycle and the shot tally, gates hit edges
//! on the armed phase, and commands moves on the motor ramp.

pub mod phase;
pub mod tally;

pub use phase::{HitReport, PhaseCoordinator, PhaseReport, TargetPhase};
pub use tally::ShotTally;
