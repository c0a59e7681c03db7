//! Port traits: the hexagonal boundary between the boot core and the board.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Sequencer / RateLoop (core)
//! ```
//!
//! Driven adapters (indicator GPIOs, the USB channel, the OS layer, the
//! logger, the topology and the task runtime) implement these traits.  The
//! core borrows them through [`Ports`], so nothing in `app` touches
//! hardware directly and every phase can be replayed against mocks.
//!
//! Sleeping is not a port of its own: the core takes any
//! [`embedded_hal::delay::DelayNs`], which both `esp-idf-hal` and the host
//! simulation provide.

use core::fmt;

use embedded_hal::delay::DelayNs;

// ───────────────────────────────────────────────────────────────
// Indicator port (hardware output handle)
// ───────────────────────────────────────────────────────────────

/// Drive mode applied during bring-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// Push-pull output, initialised to the active level.
    OutputActive,
}

/// One physical indicator output (an LED on the board).
pub trait IndicatorPort {
    /// Short identity used in diagnostics (e.g. `"led0"`).
    fn label(&self) -> &'static str;

    /// Whether the underlying GPIO controller is usable.
    fn is_ready(&self) -> bool;

    /// Configure the pin direction and initial level.
    fn configure(&mut self, mode: PinMode);

    /// Drive the output: `true` = on.
    fn set_level(&mut self, on: bool);

    /// Invert the current level.
    fn toggle(&mut self);

    /// Last level written (or read back) from the output.
    fn level(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Channel port (communication device)
// ───────────────────────────────────────────────────────────────

/// Result of asking the channel subsystem to come up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnableOutcome {
    Enabled,
    /// The stack was already running; treated exactly like [`Enabled`](Self::Enabled).
    AlreadyEnabled,
    /// Negative driver return code.
    Failed(i32),
}

impl EnableOutcome {
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Enabled | Self::AlreadyEnabled)
    }
}

/// Opaque reference to the channel device, handed to the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelHandle {
    /// Device label, e.g. `"cdc_acm_uart0"`.
    pub device: &'static str,
}

/// The communication channel used for diagnostic and topology I/O.
pub trait ChannelPort {
    /// Bring up the channel subsystem (USB stack).
    fn enable(&mut self) -> EnableOutcome;

    /// Whether the host side has enumerated the device.
    fn is_ready(&mut self) -> bool;

    /// Handle passed on to the topology.
    fn handle(&self) -> ChannelHandle;
}

// ───────────────────────────────────────────────────────────────
// OS port (process-wide runtime)
// ───────────────────────────────────────────────────────────────

/// Process-wide runtime state.  Called exactly once by the sequencer.
pub trait OsPort {
    fn init(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Diagnostic sink
// ───────────────────────────────────────────────────────────────

/// Best-effort line logger.  Nothing it returns is ever consulted.
pub trait DiagnosticSink {
    fn log(&mut self, line: fmt::Arguments<'_>);
}

// ───────────────────────────────────────────────────────────────
// Topology
// ───────────────────────────────────────────────────────────────

/// Configuration handed to topology construction.
///
/// Built on the sequencer's stack, moved into [`Topology::setup`], never
/// kept by the core afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyState {
    pub channel: ChannelHandle,
    pub uart_baud: u32,
}

/// The message-passing component graph.  Opaque to the core.
pub trait Topology {
    /// Instantiate and wire components.  Infallible from the core's view.
    fn setup(&mut self, state: TopologyState);

    /// Rate-entry point, invoked once per tick.
    fn cycle(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Task runtime
// ───────────────────────────────────────────────────────────────

/// Lifecycle of the task runtime's execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskState {
    NotStarted = 0,
    Running = 1,
    Stopped = 2,
}

impl TaskState {
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::NotStarted,
            1 => Self::Running,
            _ => Self::Stopped,
        }
    }
}

/// Execution context hosting topology-internal concurrent work.
///
/// `on_start` is fire-and-forget.  The queries are diagnostics only; the
/// tick loop never waits on them.
pub trait TaskRuntime {
    fn on_start(&mut self);
    fn state(&self) -> TaskState;
    fn priority(&self) -> u8;
    fn has_registry(&self) -> bool;
    fn num_tasks(&self) -> usize;
}

// ───────────────────────────────────────────────────────────────
// Port bundle
// ───────────────────────────────────────────────────────────────

/// Every collaborator the core needs, borrowed for the process lifetime.
///
/// The bundle is built once in `main` (or in a test) and lent to the
/// sequencer, then to the rate loop.
pub struct Ports<'a> {
    pub led0: &'a mut dyn IndicatorPort,
    pub led1: &'a mut dyn IndicatorPort,
    pub channel: &'a mut dyn ChannelPort,
    pub os: &'a mut dyn OsPort,
    pub sink: &'a mut dyn DiagnosticSink,
    pub topology: &'a mut dyn Topology,
    pub runtime: &'a mut dyn TaskRuntime,
    pub delay: &'a mut dyn DelayNs,
}

impl Ports<'_> {
    /// Drive both indicators to a fixed pattern.
    pub fn show(&mut self, pattern: IndicatorPattern) {
        self.led0.set_level(pattern.led0);
        self.led1.set_level(pattern.led1);
    }

    /// Heartbeat: invert both indicators, led0 first.
    pub fn toggle_indicators(&mut self) {
        self.led0.toggle();
        self.led1.toggle();
    }
}

/// Levels of the two indicators at a given boot phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorPattern {
    pub led0: bool,
    pub led1: bool,
}

impl IndicatorPattern {
    pub const fn new(led0: bool, led1: bool) -> Self {
        Self { led0, led1 }
    }
}
