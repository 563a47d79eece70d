//! Motor driver implementations
//!
//! DC gear motor behind an H-bridge: one direction pin and one PWM
//! channel for speed.

pub mod dc;

pub use dc::DcMotorOutput;
