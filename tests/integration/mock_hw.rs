//! Mock hardware for integration tests.
//!
//! Every mock writes into one shared journal, so a test sees the global
//! order of calls across ports (indicator writes vs. channel polls vs.
//! topology calls) rather than one history per mock.

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use ledblinker::app::ports::{
    ChannelHandle, ChannelPort, DiagnosticSink, EnableOutcome, IndicatorPort, OsPort, PinMode,
    Ports, TaskRuntime, TaskState, Topology, TopologyState,
};

// ── Journal ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Trace {
    Configure(&'static str, PinMode),
    Level(&'static str, bool),
    Toggle(&'static str),
    Enable,
    ReadyCheck(bool),
    OsInit,
    Log(String),
    Setup(TopologyState),
    Cycle,
    RuntimeStart,
    SleepMs(u32),
}

pub type Journal = Rc<RefCell<Vec<Trace>>>;

// ── Indicators ────────────────────────────────────────────────

pub struct MockLed {
    label: &'static str,
    pub ready: bool,
    level: bool,
    journal: Journal,
}

impl MockLed {
    pub fn new(label: &'static str, journal: &Journal) -> Self {
        Self {
            label,
            ready: true,
            level: false,
            journal: Rc::clone(journal),
        }
    }
}

impl IndicatorPort for MockLed {
    fn label(&self) -> &'static str {
        self.label
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn configure(&mut self, mode: PinMode) {
        self.level = mode == PinMode::OutputActive;
        self.journal
            .borrow_mut()
            .push(Trace::Configure(self.label, mode));
    }

    fn set_level(&mut self, on: bool) {
        self.level = on;
        self.journal.borrow_mut().push(Trace::Level(self.label, on));
    }

    fn toggle(&mut self) {
        self.level = !self.level;
        self.journal.borrow_mut().push(Trace::Toggle(self.label));
    }

    fn level(&self) -> bool {
        self.level
    }
}

// ── Channel ───────────────────────────────────────────────────

pub struct MockChannel {
    pub outcome: EnableOutcome,
    /// Readiness checks answered "no" after enable.
    pub polls_until_ready: u32,
    checks: u32,
    enabled: bool,
    journal: Journal,
}

impl MockChannel {
    pub fn new(polls_until_ready: u32, journal: &Journal) -> Self {
        Self {
            outcome: EnableOutcome::Enabled,
            polls_until_ready,
            checks: 0,
            enabled: false,
            journal: Rc::clone(journal),
        }
    }
}

impl ChannelPort for MockChannel {
    fn enable(&mut self) -> EnableOutcome {
        self.journal.borrow_mut().push(Trace::Enable);
        self.enabled = self.outcome.is_success();
        self.outcome
    }

    fn is_ready(&mut self) -> bool {
        let ready = self.enabled && self.checks >= self.polls_until_ready;
        self.checks += 1;
        self.journal.borrow_mut().push(Trace::ReadyCheck(ready));
        ready
    }

    fn handle(&self) -> ChannelHandle {
        ChannelHandle { device: "mock-usb" }
    }
}

// ── OS, sink, topology, runtime ───────────────────────────────

pub struct MockOs {
    journal: Journal,
}

impl OsPort for MockOs {
    fn init(&mut self) {
        self.journal.borrow_mut().push(Trace::OsInit);
    }
}

pub struct RecordingSink {
    journal: Journal,
}

impl DiagnosticSink for RecordingSink {
    fn log(&mut self, line: core::fmt::Arguments<'_>) {
        self.journal.borrow_mut().push(Trace::Log(line.to_string()));
    }
}

pub struct MockTopology {
    journal: Journal,
}

impl Topology for MockTopology {
    fn setup(&mut self, state: TopologyState) {
        self.journal.borrow_mut().push(Trace::Setup(state));
    }

    fn cycle(&mut self) {
        self.journal.borrow_mut().push(Trace::Cycle);
    }
}

pub struct MockRuntime {
    pub started: bool,
    journal: Journal,
}

impl TaskRuntime for MockRuntime {
    fn on_start(&mut self) {
        self.started = true;
        self.journal.borrow_mut().push(Trace::RuntimeStart);
    }

    fn state(&self) -> TaskState {
        if self.started {
            TaskState::Running
        } else {
            TaskState::NotStarted
        }
    }

    fn priority(&self) -> u8 {
        5
    }

    fn has_registry(&self) -> bool {
        true
    }

    fn num_tasks(&self) -> usize {
        1
    }
}

pub struct RecordingDelay {
    journal: Journal,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.journal
            .borrow_mut()
            .push(Trace::SleepMs(ns / 1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.journal.borrow_mut().push(Trace::SleepMs(ms));
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// All mocks wired to one journal.
pub struct Rig {
    pub journal: Journal,
    pub led0: MockLed,
    pub led1: MockLed,
    pub channel: MockChannel,
    pub os: MockOs,
    pub sink: RecordingSink,
    pub topology: MockTopology,
    pub runtime: MockRuntime,
    pub delay: RecordingDelay,
}

#[allow(dead_code)]
impl Rig {
    /// Rig whose channel becomes ready after `polls` intervals.
    pub fn new(polls: u32) -> Self {
        let journal: Journal = Rc::new(RefCell::new(Vec::new()));
        Self {
            led0: MockLed::new("led0", &journal),
            led1: MockLed::new("led1", &journal),
            channel: MockChannel::new(polls, &journal),
            os: MockOs {
                journal: Rc::clone(&journal),
            },
            sink: RecordingSink {
                journal: Rc::clone(&journal),
            },
            topology: MockTopology {
                journal: Rc::clone(&journal),
            },
            runtime: MockRuntime {
                started: false,
                journal: Rc::clone(&journal),
            },
            delay: RecordingDelay {
                journal: Rc::clone(&journal),
            },
            journal,
        }
    }

    pub fn ports(&mut self) -> Ports<'_> {
        Ports {
            led0: &mut self.led0,
            led1: &mut self.led1,
            channel: &mut self.channel,
            os: &mut self.os,
            sink: &mut self.sink,
            topology: &mut self.topology,
            runtime: &mut self.runtime,
            delay: &mut self.delay,
        }
    }

    pub fn trace(&self) -> Vec<Trace> {
        self.journal.borrow().clone()
    }

    pub fn clear(&self) {
        self.journal.borrow_mut().clear();
    }

    pub fn count(&self, pred: impl Fn(&Trace) -> bool) -> usize {
        self.journal.borrow().iter().filter(|t| pred(t)).count()
    }

    pub fn logs(&self) -> Vec<String> {
        self.journal
            .borrow()
            .iter()
            .filter_map(|t| match t {
                Trace::Log(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    /// Index of the first entry matching `pred`.
    pub fn position(&self, pred: impl Fn(&Trace) -> bool) -> Option<usize> {
        self.journal.borrow().iter().position(|t| pred(t))
    }
}
