//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements     | Connects to                  |
//! |-------------|----------------|------------------------------|
//! | `channel`   | ChannelPort    | USB serial/JTAG CDC driver   |
//! | `indicator` | IndicatorPort  | ESP32 GPIO (any output pin)  |
//! | `log_sink`  | DiagnosticSink | `log` facade                 |
//! | `platform`  | OsPort         | version banner               |
//! | `time`      | DelayNs        | FreeRTOS delay / esp_timer   |
//!
//! `time` also registers the `embassy-time` driver on the board.

pub mod channel;
pub mod indicator;
pub mod log_sink;
pub mod platform;
pub mod time;
