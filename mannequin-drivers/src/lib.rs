//! Hardware driver implementations
//!
//! This crate provides concrete implementations against the
//! `embedded-hal` traits for the target's peripherals:
//!
//! - DC motor output (direction pin + PWM duty)
//! - Hit sensor edge confirmation
//! - Pulsed hit relay outputs

#![no_std]
#![deny(unsafe_code)]

pub mod motor;
pub mod relay;
pub mod sensor;
