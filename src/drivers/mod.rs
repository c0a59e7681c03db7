//! Peripheral helpers below the adapter layer.

pub mod task_pin;
