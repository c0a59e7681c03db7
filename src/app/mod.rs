//! Boot core: pure sequencing logic, zero I/O.
//!
//! The readiness gate, the bootstrap sequencer and the rate loop live here.
//! All interaction with hardware happens through the **port traits** in
//! [`ports`], keeping this layer testable without a board.

pub mod ports;
pub mod rate_loop;
pub mod readiness;
pub mod sequencer;
