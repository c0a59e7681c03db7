//! Compiled-in configuration.
//!
//! The firmware has no runtime configuration surface: [`BlinkerConfig::default`]
//! is the production configuration.  The struct stays `serde`-serialisable so
//! the values can be dumped in diagnostics and compared in tests.

use serde::{Deserialize, Serialize};

use crate::drivers::task_pin::Core;
use crate::topology::{self, GROUP_RATES_HZ};

/// Core configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlinkerConfig {
    // --- Channel ---
    /// Interval between channel readiness polls (milliseconds).
    pub channel_poll_interval_ms: u32,
    /// Give up after this many polls.  `None` waits forever.
    pub channel_poll_limit: Option<u32>,
    /// Baud rate handed to the topology's UART driver.
    pub uart_baud: u32,

    // --- Rate loop ---
    /// Sleep between ticks (milliseconds).
    pub tick_period_ms: u32,
    /// Emit a runtime status line every N cycles (0 = never).
    pub status_report_interval_cycles: u64,

    // --- Task runtime ---
    /// Priority of the runtime thread.
    pub runtime_priority: u8,
    /// Stack size of the runtime thread (KiB).
    pub runtime_stack_kb: usize,
    /// Core the runtime thread is pinned to.
    pub runtime_core: Core,
}

impl Default for BlinkerConfig {
    fn default() -> Self {
        Self {
            // Channel
            channel_poll_interval_ms: 3000,
            channel_poll_limit: None,
            uart_baud: 115_200,

            // Rate loop
            tick_period_ms: 1,                     // 1 kHz
            status_report_interval_cycles: 10_000, // ~10 s

            // Task runtime
            runtime_priority: 5,
            runtime_stack_kb: 8,
            runtime_core: Core::App,
        }
    }
}

/// Range violation found by [`BlinkerConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ZeroPollInterval,
    ZeroTickPeriod,
    ZeroBaud,
    ZeroStack,
    /// A rate group of the production layout cannot be derived from the tick.
    UnreachableGroupRate { tick_ms: u32, hz: u32 },
    /// The tick is shorter than one scheduler tick of the OS.
    TickBelowOsResolution { tick_ms: u32, os_tick_hz: u32 },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ZeroPollInterval => write!(f, "channel poll interval must be > 0"),
            Self::ZeroTickPeriod => write!(f, "tick period must be > 0"),
            Self::ZeroBaud => write!(f, "uart baud must be > 0"),
            Self::ZeroStack => write!(f, "runtime stack must be > 0"),
            Self::UnreachableGroupRate { tick_ms, hz } => {
                write!(f, "{hz} Hz group not reachable from a {tick_ms} ms tick")
            }
            Self::TickBelowOsResolution { tick_ms, os_tick_hz } => {
                write!(f, "{tick_ms} ms tick is finer than the {os_tick_hz} Hz OS tick")
            }
        }
    }
}

impl core::error::Error for ConfigError {}

impl BlinkerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.tick_period_ms == 0 {
            return Err(ConfigError::ZeroTickPeriod);
        }
        if self.uart_baud == 0 {
            return Err(ConfigError::ZeroBaud);
        }
        if self.runtime_stack_kb == 0 {
            return Err(ConfigError::ZeroStack);
        }
        for hz in GROUP_RATES_HZ {
            if !topology::rate_reachable(self.tick_period_ms, hz) {
                return Err(ConfigError::UnreachableGroupRate {
                    tick_ms: self.tick_period_ms,
                    hz,
                });
            }
        }
        Ok(())
    }

    /// The blocking delay cannot sleep less than one OS tick, so a shorter
    /// period would silently stretch every rate group.
    pub fn check_os_tick(&self, os_tick_hz: u32) -> Result<(), ConfigError> {
        if u64::from(self.tick_period_ms) * u64::from(os_tick_hz) < 1000 {
            return Err(ConfigError::TickBelowOsResolution {
                tick_ms: self.tick_period_ms,
                os_tick_hz,
            });
        }
        Ok(())
    }

    /// One-line JSON dump for the boot log.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}
