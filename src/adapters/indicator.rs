//! Indicator adapter: an LED behind [`IndicatorPort`].
//!
//! Generic over any `embedded-hal` 1.0 [`StatefulOutputPin`], so the same
//! adapter drives an `esp_idf_hal::gpio::PinDriver` on the board and a
//! [`SimPin`] on the host.  A pin whose driver could not be created is
//! stored as `None` and reports not-ready; the sequencer turns that into a
//! quiet exit.

use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};
use log::warn;

use crate::app::ports::{IndicatorPort, PinMode};

pub struct GpioIndicator<P> {
    label: &'static str,
    pin: Option<P>,
    /// Shadow of the last level written; used when the pin can't be read back.
    level: bool,
}

impl<P: StatefulOutputPin> GpioIndicator<P> {
    pub fn new(label: &'static str, pin: Option<P>) -> Self {
        Self {
            label,
            pin,
            level: false,
        }
    }

    /// Borrow the underlying pin (tests and diagnostics).
    pub fn pin(&self) -> Option<&P> {
        self.pin.as_ref()
    }

    fn drive(&mut self, on: bool) {
        let Some(pin) = self.pin.as_mut() else {
            return;
        };
        let res = if on { pin.set_high() } else { pin.set_low() };
        match res {
            Ok(()) => self.level = on,
            Err(e) => warn!("{}: write failed: {:?}", self.label, e),
        }
    }
}

impl<P: StatefulOutputPin> IndicatorPort for GpioIndicator<P> {
    fn label(&self) -> &'static str {
        self.label
    }

    fn is_ready(&self) -> bool {
        self.pin.is_some()
    }

    fn configure(&mut self, mode: PinMode) {
        // Direction is fixed when the output driver is created; configuring
        // only establishes the initial level.
        match mode {
            PinMode::OutputActive => self.drive(true),
        }
    }

    fn set_level(&mut self, on: bool) {
        self.drive(on);
    }

    fn toggle(&mut self) {
        let Some(pin) = self.pin.as_mut() else {
            return;
        };
        match pin.toggle() {
            Ok(()) => self.level = !self.level,
            Err(e) => warn!("{}: toggle failed: {:?}", self.label, e),
        }
    }

    fn level(&self) -> bool {
        self.level
    }
}

// ── Host simulation pin ──────────────────────────────────────

/// In-memory output pin for host builds.  Counts writes so tests can
/// assert on activity without a logic analyser.
#[derive(Debug, Default, Clone)]
pub struct SimPin {
    high: bool,
    writes: u32,
}

impl SimPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_high(&self) -> bool {
        self.high
    }

    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        self.writes += 1;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        self.writes += 1;
        Ok(())
    }
}

impl StatefulOutputPin for SimPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high)
    }
}
