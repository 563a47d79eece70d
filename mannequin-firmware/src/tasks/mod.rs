//! Embassy async tasks
//!
//! Each task runs independently and communicates via the statics in
//! [`crate::channels`].

pub mod control;
pub mod detect;
pub mod relay;

pub use control::{control_task, ControlPins};
pub use detect::detect_task;
pub use relay::relay_task;
