//! Process-wide runtime adapter.
//!
//! OS-layer init runs once, after the channel is up, and announces the
//! firmware version so the first line a host sees identifies the build.
//! The `log` backend itself is installed by `main` before anything else
//! runs, and a failure there aborts start-up.

use log::{info, warn};

use crate::app::ports::OsPort;

#[derive(Default)]
pub struct Platform {
    initialised: bool,
}

impl Platform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised
    }
}

impl OsPort for Platform {
    fn init(&mut self) {
        if self.initialised {
            warn!("platform: init called twice, ignoring");
            return;
        }
        self.initialised = true;
        info!("LedBlinker v{}", env!("CARGO_PKG_VERSION"));
    }
}
