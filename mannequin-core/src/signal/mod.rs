//! Signals crossing from the detection front end into the control loop

pub mod edges;

pub use edges::{EdgeBus, EdgeChannel, EdgeSet};
