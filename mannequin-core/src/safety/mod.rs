//! Safety monitoring
//!
//! Detects endstop faults that would otherwise leave the motor running.

pub mod monitor;

pub use monitor::{FaultKind, FaultMonitor, SafetyStatus};
