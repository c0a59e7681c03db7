//! LedBlinker Firmware: Main Entry Point
//!
//! Hexagonal layout: the boot core talks to hardware only through port
//! traits, bundled in [`Ports`] and lent to the sequencer and then the rate
//! loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  GpioIndicator ×2   UsbCdcChannel   Platform   LogDiagnostic │
//! │  (IndicatorPort)    (ChannelPort)   (OsPort)   (Sink)        │
//! │  RateGroupDriver    PinnedTaskRuntime          FreeRtos      │
//! │  (Topology)         (TaskRuntime)              (DelayNs)     │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │   Sequencer (six phases, fail-fast)  ──▶  RateLoop (forever) │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use core::time::Duration;

use anyhow::{Context, Result};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyOutputPin, PinDriver};
use log::{error, info};

use ledblinker::adapters::channel::UsbCdcChannel;
use ledblinker::adapters::indicator::GpioIndicator;
use ledblinker::adapters::log_sink::LogDiagnosticSink;
use ledblinker::adapters::platform::Platform;
use ledblinker::app::ports::Ports;
use ledblinker::app::rate_loop::RateLoop;
use ledblinker::app::sequencer::Sequencer;
use ledblinker::config::BlinkerConfig;
use ledblinker::pins;
use ledblinker::runtime::PinnedTaskRuntime;
use ledblinker::topology::{self, Heartbeat};

/// Period of the runtime-side heartbeat task.
const RUNTIME_HEARTBEAT: Duration = Duration::from_secs(1);

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    let config = BlinkerConfig::default();
    config.validate().context("invalid compiled-in config")?;
    config
        .check_os_tick(esp_idf_svc::sys::CONFIG_FREERTOS_HZ)
        .context("CONFIG_FREERTOS_HZ too coarse for tick_period_ms")?;

    // ── 2. Construct adapters ─────────────────────────────────
    // A pin whose driver cannot be created is passed as `None`; the
    // sequencer reports it as "not ready" and the process exits quietly.
    // SAFETY: the LED GPIOs in `pins` are claimed here and nowhere else.
    let (led0_pin, led1_pin) =
        unsafe { (AnyOutputPin::new(pins::LED0_GPIO), AnyOutputPin::new(pins::LED1_GPIO)) };
    let mut led0 = GpioIndicator::new(pins::LED0_LABEL, PinDriver::output(led0_pin).ok());
    let mut led1 = GpioIndicator::new(pins::LED1_LABEL, PinDriver::output(led1_pin).ok());

    let mut channel = UsbCdcChannel::new();
    let mut os = Platform::new();
    let mut sink = LogDiagnosticSink::new();
    let mut rate_groups = topology::build(config.tick_period_ms).context("topology layout")?;

    let heartbeat = Heartbeat::new();
    let mut runtime = PinnedTaskRuntime::from_config(&config);
    runtime
        .register("heartbeat", move || heartbeat.run(RUNTIME_HEARTBEAT))
        .context("task registry")?;

    let mut delay = FreeRtos;

    let mut ports = Ports {
        led0: &mut led0,
        led1: &mut led1,
        channel: &mut channel,
        os: &mut os,
        sink: &mut sink,
        topology: &mut rate_groups,
        runtime: &mut runtime,
        delay: &mut delay,
    };

    // ── 3. Boot sequence ──────────────────────────────────────
    let mut sequencer = Sequencer::new(&config);
    if let Err(e) = sequencer.run(&mut ports) {
        if !e.is_silent() {
            error!("boot aborted: {}", e);
        }
        std::process::exit(e.exit_code());
    }

    info!("config: {}", config.to_json());

    // ── 4. Rate loop (never returns) ──────────────────────────
    RateLoop::new(&config).run_forever(&mut ports)
}
