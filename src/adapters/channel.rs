//! USB CDC channel adapter.
//!
//! - **`target_os = "espidf"`**: installs the USB serial/JTAG driver.  A
//!   second install reports `ESP_ERR_INVALID_STATE`, which maps to
//!   [`EnableOutcome::AlreadyEnabled`].  Readiness is "a host has
//!   enumerated the device and is polling it".
//! - **`not(target_os = "espidf")`**: simulation that enumerates after a
//!   fixed number of readiness checks.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::app::ports::{ChannelHandle, ChannelPort, EnableOutcome};
use crate::pins;

#[cfg(target_os = "espidf")]
const USB_TX_BUF: u32 = 256;
#[cfg(target_os = "espidf")]
const USB_RX_BUF: u32 = 256;

pub struct UsbCdcChannel {
    handle: ChannelHandle,
    #[cfg(not(target_os = "espidf"))]
    sim: SimUsb,
}

#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, Copy)]
struct SimUsb {
    enabled: bool,
    polls_until_ready: u32,
}

impl UsbCdcChannel {
    #[cfg(target_os = "espidf")]
    pub fn new() -> Self {
        Self {
            handle: ChannelHandle {
                device: pins::USB_CDC_DEVICE,
            },
        }
    }

    /// Simulated channel that enumerates after `polls_until_ready` checks.
    #[cfg(not(target_os = "espidf"))]
    pub fn new(polls_until_ready: u32) -> Self {
        Self {
            handle: ChannelHandle {
                device: pins::USB_CDC_DEVICE,
            },
            sim: SimUsb {
                enabled: false,
                polls_until_ready,
            },
        }
    }
}

#[cfg(target_os = "espidf")]
impl Default for UsbCdcChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelPort for UsbCdcChannel {
    #[cfg(target_os = "espidf")]
    fn enable(&mut self) -> EnableOutcome {
        let mut cfg = usb_serial_jtag_driver_config_t {
            tx_buffer_size: USB_TX_BUF,
            rx_buffer_size: USB_RX_BUF,
        };
        // SAFETY: called once from the single foreground context during boot;
        // the driver copies `cfg` before returning.
        let ret = unsafe { usb_serial_jtag_driver_install(&mut cfg) };
        match ret {
            rc if rc == ESP_OK as i32 => EnableOutcome::Enabled,
            rc if rc == ESP_ERR_INVALID_STATE as i32 => EnableOutcome::AlreadyEnabled,
            rc => EnableOutcome::Failed(rc),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn enable(&mut self) -> EnableOutcome {
        if self.sim.enabled {
            return EnableOutcome::AlreadyEnabled;
        }
        self.sim.enabled = true;
        log::info!("usb(sim): stack enabled");
        EnableOutcome::Enabled
    }

    #[cfg(target_os = "espidf")]
    fn is_ready(&mut self) -> bool {
        // SAFETY: read-only query of the USB serial/JTAG peripheral state.
        unsafe { usb_serial_jtag_is_connected() }
    }

    #[cfg(not(target_os = "espidf"))]
    fn is_ready(&mut self) -> bool {
        if !self.sim.enabled {
            return false;
        }
        if self.sim.polls_until_ready == 0 {
            return true;
        }
        self.sim.polls_until_ready -= 1;
        false
    }

    fn handle(&self) -> ChannelHandle {
        self.handle
    }
}
