//! Hardware abstraction traits
//!
//! These traits define the interface between the control logic
//! and hardware-specific implementations.

pub mod motor;

pub use motor::{Direction, MotorDrive, MotorError, MotorOutput};
