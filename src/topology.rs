//! Rate-group topology.
//!
//! The components behind the rate-entry point are outside the boot core;
//! this module supplies the entry point itself.  [`RateGroupDriver`] takes
//! the base tick from the rate loop and fans it out to rate groups by
//! integer divider.  With the default 1 ms tick:
//!
//! ```text
//!   RateLoop ── cycle() ──▶ RateGroupDriver (1 kHz)
//!                              ├─ ÷10   ─▶ RateGroup 100 Hz ─▶ members
//!                              ├─ ÷100  ─▶ RateGroup  10 Hz ─▶ members
//!                              └─ ÷1000 ─▶ RateGroup   1 Hz ─▶ members
//! ```
//!
//! The rates hold only if the rate loop really sleeps one tick period.  On
//! the board that needs a FreeRTOS tick of at least `1000 / tick_period_ms`
//! Hz (`sdkconfig.defaults` sets 1000 Hz; `main` checks it at start-up).
//!
//! Group and member tables are fixed-capacity (`heapless`), filled during
//! construction and never resized afterwards.

use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::adapters::time::Uptime;
use crate::app::ports::{Topology, TopologyState};

pub const MAX_GROUPS: usize = 4;
pub const MAX_MEMBERS: usize = 8;

/// Rates of the production layout, fastest first.
pub const GROUP_RATES_HZ: [u32; 3] = [100, 10, 1];

/// Whether a group at `hz` can be derived from a `tick_period_ms` base tick
/// by an integer divider.
pub const fn rate_reachable(tick_period_ms: u32, hz: u32) -> bool {
    if tick_period_ms == 0 || hz == 0 || 1000 % tick_period_ms != 0 {
        return false;
    }
    let base_hz = 1000 / tick_period_ms;
    hz <= base_hz && base_hz % hz == 0
}

/// A component driven by a rate group.
pub trait Scheduled {
    fn name(&self) -> &'static str;

    /// Called once per group activation.  `context` is the group's run
    /// count, truncated.
    fn run(&mut self, context: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyError {
    TooManyGroups,
    TooManyMembers,
    NoSuchGroup(usize),
    /// Requested rate does not divide the base tick rate.
    BadRate { hz: u32 },
}

impl core::fmt::Display for TopologyError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TooManyGroups => write!(f, "rate group table full"),
            Self::TooManyMembers => write!(f, "rate group member table full"),
            Self::NoSuchGroup(i) => write!(f, "no rate group {i}"),
            Self::BadRate { hz } => write!(f, "{hz} Hz is not reachable from the base tick"),
        }
    }
}

impl core::error::Error for TopologyError {}

pub struct RateGroup {
    divider: u64,
    runs: u64,
    members: heapless::Vec<Box<dyn Scheduled>, MAX_MEMBERS>,
}

impl RateGroup {
    pub fn runs(&self) -> u64 {
        self.runs
    }

    pub fn divider(&self) -> u64 {
        self.divider
    }

    fn dispatch(&mut self) {
        self.runs += 1;
        let context = self.runs as u32;
        for m in &mut self.members {
            m.run(context);
        }
    }
}

pub struct RateGroupDriver {
    tick_period_ms: u32,
    base_hz: u32,
    state: Option<TopologyState>,
    cycles: u64,
    dropped: u64,
    groups: heapless::Vec<RateGroup, MAX_GROUPS>,
}

impl RateGroupDriver {
    /// Driver ticked every `tick_period_ms` milliseconds.
    pub fn new(tick_period_ms: u32) -> Self {
        Self {
            tick_period_ms,
            base_hz: 1000 / tick_period_ms.max(1),
            state: None,
            cycles: 0,
            dropped: 0,
            groups: heapless::Vec::new(),
        }
    }

    /// Add a group running at `hz`.  Returns its index.
    pub fn add_group(&mut self, hz: u32) -> Result<usize, TopologyError> {
        if !rate_reachable(self.tick_period_ms, hz) {
            return Err(TopologyError::BadRate { hz });
        }
        let group = RateGroup {
            divider: u64::from(self.base_hz / hz),
            runs: 0,
            members: heapless::Vec::new(),
        };
        self.groups
            .push(group)
            .map_err(|_| TopologyError::TooManyGroups)?;
        Ok(self.groups.len() - 1)
    }

    pub fn add_member(
        &mut self,
        group: usize,
        member: Box<dyn Scheduled>,
    ) -> Result<(), TopologyError> {
        let g = self
            .groups
            .get_mut(group)
            .ok_or(TopologyError::NoSuchGroup(group))?;
        debug!("topology: '{}' joins group {}", member.name(), group);
        g.members
            .push(member)
            .map_err(|_| TopologyError::TooManyMembers)
    }

    pub fn group(&self, index: usize) -> Option<&RateGroup> {
        self.groups.get(index)
    }

    pub fn state(&self) -> Option<&TopologyState> {
        self.state.as_ref()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Cycles received before `setup`.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Topology for RateGroupDriver {
    fn setup(&mut self, state: TopologyState) {
        info!(
            "topology: {} groups on {} @ {} baud",
            self.groups.len(),
            state.channel.device,
            state.uart_baud
        );
        self.state = Some(state);
    }

    fn cycle(&mut self) {
        if self.state.is_none() {
            if self.dropped == 0 {
                warn!("topology: cycle before setup, dropping");
            }
            self.dropped += 1;
            return;
        }
        self.cycles += 1;
        for g in &mut self.groups {
            if self.cycles % g.divider == 0 {
                g.dispatch();
            }
        }
    }
}

// ── Components ───────────────────────────────────────────────

/// Logs uptime once per activation.
pub struct UptimeReporter {
    uptime: Uptime,
}

impl UptimeReporter {
    pub fn new(uptime: Uptime) -> Self {
        Self { uptime }
    }
}

impl Scheduled for UptimeReporter {
    fn name(&self) -> &'static str {
        "uptime"
    }

    fn run(&mut self, context: u32) {
        debug!("uptime: {}s (run {})", self.uptime.secs(), context);
    }
}

/// Runtime-side liveness task: counts a beat every `period`, forever.
///
/// The counter is shared so the foreground can read it for diagnostics.
#[derive(Clone, Default)]
pub struct Heartbeat {
    beats: Arc<AtomicU64>,
}

impl Heartbeat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn beats(&self) -> u64 {
        self.beats.load(Ordering::Relaxed)
    }

    pub async fn run(self, period: Duration) {
        loop {
            async_io_mini::Timer::after(period).await;
            let n = self.beats.fetch_add(1, Ordering::Relaxed) + 1;
            debug!("runtime: heartbeat {}", n);
        }
    }
}

/// The production layout: 100 Hz, 10 Hz and 1 Hz groups, uptime on 1 Hz.
pub fn build(tick_period_ms: u32) -> Result<RateGroupDriver, TopologyError> {
    let mut driver = RateGroupDriver::new(tick_period_ms);
    let mut slowest = 0;
    for hz in GROUP_RATES_HZ {
        slowest = driver.add_group(hz)?;
    }
    driver.add_member(slowest, Box::new(UptimeReporter::new(Uptime::new())))?;
    Ok(driver)
}
