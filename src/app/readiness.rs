//! Readiness gate.
//!
//! Two kinds of wait sit in front of the boot sequence:
//!
//! - indicator GPIOs are checked exactly once; the caller decides what a
//!   failure means (the sequencer aborts).
//! - the channel is polled at a fixed interval.  Every interval that
//!   elapses without readiness toggles both indicators, which is the only
//!   progress signal a headless board has.  With the default policy there
//!   is no timeout: the wait ends when the host enumerates the device or
//!   the board is reset.

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::error::BootError;

use super::ports::{ChannelPort, IndicatorPort};

/// How the channel poll paces itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval_ms: u32,
    /// `None` = poll forever.
    pub limit: Option<u32>,
}

impl PollPolicy {
    pub const fn unbounded(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            limit: None,
        }
    }
}

/// Single readiness check, no retry.
pub fn check_peripheral(indicator: &dyn IndicatorPort) -> bool {
    let ready = indicator.is_ready();
    if !ready {
        debug!("gate: {} not ready", indicator.label());
    }
    ready
}

/// Block until `channel` reports ready.
///
/// Each unsuccessful check sleeps one interval then toggles `led0` and
/// `led1`.  Returns the number of sleep-and-toggle cycles performed, which
/// is exactly `N` for a channel that becomes ready after `N` intervals.
pub fn poll_until_ready(
    channel: &mut dyn ChannelPort,
    led0: &mut dyn IndicatorPort,
    led1: &mut dyn IndicatorPort,
    delay: &mut dyn DelayNs,
    policy: PollPolicy,
) -> Result<u32, BootError> {
    let mut polls: u32 = 0;
    while !channel.is_ready() {
        if policy.limit.is_some_and(|limit| polls >= limit) {
            return Err(BootError::ChannelNeverReady { polls });
        }
        delay.delay_ms(policy.interval_ms);
        led0.toggle();
        led1.toggle();
        polls = polls.saturating_add(1);
    }
    debug!("gate: channel ready after {} polls", polls);
    Ok(polls)
}
