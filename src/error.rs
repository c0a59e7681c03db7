//! Boot failure taxonomy.
//!
//! Every recognised failure is fatal to the whole process: the sequencer
//! aborts and `main` exits with [`BootError::exit_code`].  All variants are
//! `Copy` so they can be stored in the sequencer's terminal state without
//! allocation.

use core::fmt;

/// Exit code for outcomes that are not errors (hardware absent).
pub const EXIT_NEUTRAL: i32 = 0;
/// Exit code for fatal bring-up errors.
pub const EXIT_FAILURE: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootError {
    /// An indicator output failed its readiness check.  Wiring faults do not
    /// self-heal, so the process exits quietly.
    HardwareNotReady { indicator: &'static str },
    /// The channel stack refused to come up (anything but "already enabled").
    ChannelEnableFailure { code: i32 },
    /// The channel stayed down for the configured number of polls.
    /// Unreachable with the default (unbounded) poll policy.
    ChannelNeverReady { polls: u32 },
    /// The sequencer has already run once in this process.
    AlreadyRan,
}

impl BootError {
    /// Process outcome for this failure.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::HardwareNotReady { .. } => EXIT_NEUTRAL,
            Self::ChannelEnableFailure { .. }
            | Self::ChannelNeverReady { .. }
            | Self::AlreadyRan => EXIT_FAILURE,
        }
    }

    /// Whether the process should exit without reporting anything.
    pub const fn is_silent(&self) -> bool {
        matches!(self, Self::HardwareNotReady { .. })
    }
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HardwareNotReady { indicator } => write!(f, "{indicator} not ready"),
            Self::ChannelEnableFailure { code } => {
                write!(f, "channel enable failed (rc={code})")
            }
            Self::ChannelNeverReady { polls } => {
                write!(f, "channel not ready after {polls} polls")
            }
            Self::AlreadyRan => write!(f, "boot sequence already ran"),
        }
    }
}

impl core::error::Error for BootError {}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, BootError>;
