//! Bootstrap sequencer: ordered, fail-fast bring-up.
//!
//! ```text
//!  NotStarted ─▶ HardwareValidated ─▶ OutputsConfigured ─▶ ChannelEnabled
//!       │                                                        │
//!       ▼                                                        ▼
//!    Aborted ◀──────────── (any failure) ─────────────────  ChannelReady
//!                                                                │
//!  TaskRuntimeStarted ◀── TopologyBuilt ◀── RuntimeInitialized ◀─┘
//! ```
//!
//! Each phase either succeeds and moves on, or aborts the whole process.
//! There is no retry and no rollback.  Between phases the two indicators
//! are driven to a phase-specific pattern: on a board without a display the
//! LEDs are the only way to see how far boot got.
//!
//! | After phase          | led0 | led1 |
//! |----------------------|------|------|
//! | OutputsConfigured    | on   | on   |
//! | ChannelEnabled       | off  | off  |
//! | (channel wait)       | toggling    |
//! | RuntimeInitialized   | off  | on   |
//! | TopologyBuilt        | on   | off  |
//! | TaskRuntimeStarted   | off  | off  |

use log::{debug, info};

use crate::config::BlinkerConfig;
use crate::error::{BootError, Result};

use super::ports::{EnableOutcome, IndicatorPattern, PinMode, Ports, TopologyState};
use super::readiness::{self, PollPolicy};

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootPhase {
    NotStarted,
    HardwareValidated,
    OutputsConfigured,
    ChannelEnabled,
    ChannelReady,
    RuntimeInitialized,
    TopologyBuilt,
    /// Terminal: control passes to the rate loop.
    TaskRuntimeStarted,
    /// Terminal: a phase failed.
    Aborted(BootError),
}

impl BootPhase {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::HardwareValidated => "HardwareValidated",
            Self::OutputsConfigured => "OutputsConfigured",
            Self::ChannelEnabled => "ChannelEnabled",
            Self::ChannelReady => "ChannelReady",
            Self::RuntimeInitialized => "RuntimeInitialized",
            Self::TopologyBuilt => "TopologyBuilt",
            Self::TaskRuntimeStarted => "TaskRuntimeStarted",
            Self::Aborted(_) => "Aborted",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::TaskRuntimeStarted | Self::Aborted(_))
    }
}

// Indicator patterns shown after each phase.
pub const PATTERN_OUTPUTS_CONFIGURED: IndicatorPattern = IndicatorPattern::new(true, true);
pub const PATTERN_CHANNEL_ENABLED: IndicatorPattern = IndicatorPattern::new(false, false);
pub const PATTERN_RUNTIME_INITIALIZED: IndicatorPattern = IndicatorPattern::new(false, true);
pub const PATTERN_TOPOLOGY_BUILT: IndicatorPattern = IndicatorPattern::new(true, false);
pub const PATTERN_HANDOFF: IndicatorPattern = IndicatorPattern::new(false, false);

// Diagnostic lines, in emission order.
pub const MSG_PROGRAM_STARTED: &str = "Program Started";
pub const MSG_SETUP_TOPOLOGY: &str = "Setup topology";
pub const MSG_TRYING_TO_START: &str = "Trying to start";

/// What a successful boot observed.  Deliberately silent on whether the
/// channel was freshly enabled or already up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootReport {
    /// Heartbeat cycles spent waiting for the channel.
    pub channel_polls: u32,
    /// State handed to the topology.
    pub topology: TopologyState,
}

// ---------------------------------------------------------------------------
// Sequencer
// ---------------------------------------------------------------------------

pub struct Sequencer {
    phase: BootPhase,
    poll: PollPolicy,
    uart_baud: u32,
}

impl Sequencer {
    pub fn new(config: &BlinkerConfig) -> Self {
        Self {
            phase: BootPhase::NotStarted,
            poll: PollPolicy {
                interval_ms: config.channel_poll_interval_ms,
                limit: config.channel_poll_limit,
            },
            uart_baud: config.uart_baud,
        }
    }

    pub fn phase(&self) -> BootPhase {
        self.phase
    }

    /// Run all six phases against `ports`.
    ///
    /// On success the sequencer sits in [`BootPhase::TaskRuntimeStarted`]
    /// and the caller is expected to enter the rate loop.  On failure it
    /// sits in [`BootPhase::Aborted`] and the error carries the exit
    /// outcome.  The sequence runs at most once.
    pub fn run(&mut self, ports: &mut Ports<'_>) -> Result<BootReport> {
        if self.phase != BootPhase::NotStarted {
            return Err(BootError::AlreadyRan);
        }
        match self.sequence(ports) {
            Ok(report) => Ok(report),
            Err(e) => {
                self.advance(BootPhase::Aborted(e));
                Err(e)
            }
        }
    }

    fn sequence(&mut self, ports: &mut Ports<'_>) -> Result<BootReport> {
        // 1. Both indicators must be usable.
        for led in [&*ports.led0, &*ports.led1] {
            if !readiness::check_peripheral(led) {
                return Err(BootError::HardwareNotReady {
                    indicator: led.label(),
                });
            }
        }
        self.advance(BootPhase::HardwareValidated);

        // 2. Drive both outputs on.
        ports.led0.configure(PinMode::OutputActive);
        ports.led1.configure(PinMode::OutputActive);
        ports.show(PATTERN_OUTPUTS_CONFIGURED);
        self.advance(BootPhase::OutputsConfigured);

        // 3. Channel stack up; "already enabled" is a success.
        match ports.channel.enable() {
            EnableOutcome::Enabled => debug!("boot: channel enabled"),
            EnableOutcome::AlreadyEnabled => debug!("boot: channel already enabled"),
            EnableOutcome::Failed(code) => {
                return Err(BootError::ChannelEnableFailure { code });
            }
        }
        ports.show(PATTERN_CHANNEL_ENABLED);
        self.advance(BootPhase::ChannelEnabled);

        // 4. Wait for enumeration.
        let channel_polls = readiness::poll_until_ready(
            &mut *ports.channel,
            &mut *ports.led0,
            &mut *ports.led1,
            &mut *ports.delay,
            self.poll,
        )?;
        self.advance(BootPhase::ChannelReady);

        // 5. Process-wide runtime, before any logging or topology call.
        ports.os.init();
        ports.sink.log(format_args!("{MSG_PROGRAM_STARTED}"));
        ports.show(PATTERN_RUNTIME_INITIALIZED);
        self.advance(BootPhase::RuntimeInitialized);

        // 6. Topology, then the task runtime.
        let state = TopologyState {
            channel: ports.channel.handle(),
            uart_baud: self.uart_baud,
        };
        ports.topology.setup(state);
        ports.sink.log(format_args!("{MSG_SETUP_TOPOLOGY}"));
        ports.show(PATTERN_TOPOLOGY_BUILT);
        self.advance(BootPhase::TopologyBuilt);

        ports.sink.log(format_args!("{MSG_TRYING_TO_START}"));
        ports.runtime.on_start();
        debug!(
            "boot: runtime state={:?} pri={} tasks={}",
            ports.runtime.state(),
            ports.runtime.priority(),
            ports.runtime.num_tasks()
        );
        ports.show(PATTERN_HANDOFF);
        self.advance(BootPhase::TaskRuntimeStarted);

        info!("boot: complete after {} channel polls", channel_polls);
        Ok(BootReport {
            channel_polls,
            topology: state,
        })
    }

    fn advance(&mut self, next: BootPhase) {
        debug!("boot: {} -> {}", self.phase.name(), next.name());
        self.phase = next;
    }
}
