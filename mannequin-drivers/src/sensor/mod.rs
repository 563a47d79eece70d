//! Hit sensor front end

pub mod confirm;

pub use confirm::{confirm_high, ConfirmConfig};
