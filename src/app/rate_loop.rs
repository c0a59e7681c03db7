//! Rate-driven execution loop.
//!
//! Entered once, after the sequencer reaches `TaskRuntimeStarted`, and owns
//! the foreground context from then on.  One iteration:
//!
//! 1. toggle both indicators (liveness heartbeat),
//! 2. call the topology's rate-entry point exactly once,
//! 3. sleep one tick period.
//!
//! No jitter compensation, no catch-up on overrun, no exit.  Production
//! calls [`RateLoop::run_forever`]; tests drive the same step through
//! [`RateLoop::run_while`] with a continue predicate.

use log::debug;

use crate::config::BlinkerConfig;

use super::ports::Ports;

pub struct RateLoop {
    /// Completed ticks.  Wraps at `u64::MAX`.
    cycles: u64,
    period_ms: u32,
    report_every: u64,
}

impl RateLoop {
    pub fn new(config: &BlinkerConfig) -> Self {
        Self {
            cycles: 0,
            period_ms: config.tick_period_ms,
            report_every: config.status_report_interval_cycles,
        }
    }

    /// Number of completed ticks.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// One tick: heartbeat, cycle, sleep.
    pub fn step(&mut self, ports: &mut Ports<'_>) {
        ports.toggle_indicators();
        ports.topology.cycle();
        self.cycles = self.cycles.wrapping_add(1);
        self.report(ports);
        ports.delay.delay_ms(self.period_ms);
    }

    /// Tick while `keep_running(cycles)` holds.  Returns the cycle count.
    pub fn run_while(
        &mut self,
        ports: &mut Ports<'_>,
        mut keep_running: impl FnMut(u64) -> bool,
    ) -> u64 {
        while keep_running(self.cycles) {
            self.step(ports);
        }
        self.cycles
    }

    /// Tick until power loss or reset.
    pub fn run_forever(&mut self, ports: &mut Ports<'_>) -> ! {
        debug!("rate loop: entering at {} ms/tick", self.period_ms);
        loop {
            self.step(ports);
        }
    }

    /// Diagnostic only: the loop never waits on the runtime's state.
    fn report(&self, ports: &Ports<'_>) {
        if self.report_every == 0 || self.cycles % self.report_every != 0 {
            return;
        }
        debug!(
            "rate loop: cycles={} runtime state={:?} tasks={} pri={} registry={}",
            self.cycles,
            ports.runtime.state(),
            ports.runtime.num_tasks(),
            ports.runtime.priority(),
            ports.runtime.has_registry()
        );
    }
}
