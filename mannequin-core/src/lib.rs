//! Board-agnostic core logic for the mannequin target firmware
//!
//! This crate contains all control logic that does not depend on
//! specific hardware implementations:
//!
//! - Edge signal bus shared with the hit detection front end
//! - Limit switch tracking
//! - Five-stage motor ramp
//! - Target phase coordinator and shot tally
//! - Endstop fault monitoring
//! - Configuration type definitions
//!
//! [`TargetController`] ties them together into one control tick.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod controller;
pub mod motion;
pub mod safety;
pub mod signal;
pub mod state;
pub mod time;
pub mod traits;

pub use controller::{TargetController, TickReport};
