//! GPIO / device assignments for the LedBlinker board.
//!
//! Single source of truth: `main` takes the pins named here and nothing
//! else hard-codes pin numbers.

// ---------------------------------------------------------------------------
// Indicator LEDs (active HIGH)
// ---------------------------------------------------------------------------

/// Indicator 0: boot phase / heartbeat.
pub const LED0_GPIO: i32 = 2;
/// Indicator 1: boot phase / heartbeat.
pub const LED1_GPIO: i32 = 3;

pub const LED0_LABEL: &str = "led0";
pub const LED1_LABEL: &str = "led1";

// ---------------------------------------------------------------------------
// Communication channel
// ---------------------------------------------------------------------------

/// USB CDC-ACM device carrying diagnostics and topology I/O.
pub const USB_CDC_DEVICE: &str = "cdc_acm_uart0";

/// USB D-/D+ pads, owned by the CDC-ACM stack.
pub const USB_DM_GPIO: i32 = 19;
pub const USB_DP_GPIO: i32 = 20;

/// Highest GPIO number on the ESP32-S3.
pub const MAX_GPIO: i32 = 48;
