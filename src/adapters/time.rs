//! Time adapters: monotonic uptime and the blocking delay.
//!
//! - **`target_os = "espidf"`**: uptime wraps `esp_timer_get_time()`;
//!   `main` uses `esp_idf_hal::delay::FreeRtos` for delays, whose smallest
//!   sleep is one scheduler tick.
//!   The same counter backs the `embassy-time` driver that async timers
//!   (`async_io_mini::Timer`) on the task runtime wait on.
//! - **`not(target_os = "espidf")`**: `std::time::Instant` and
//!   `std::thread::sleep` for host simulation; tests link the
//!   `embassy-time` std driver.

/// Monotonic time since boot.
pub struct Uptime {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Uptime {
    fn default() -> Self {
        Self::new()
    }
}

impl Uptime {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot.
    #[cfg(target_os = "espidf")]
    pub fn micros(&self) -> u64 {
        // SAFETY: esp_timer_get_time reads the RTC-backed high-res counter.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since construction.
    #[cfg(not(target_os = "espidf"))]
    pub fn micros(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    pub fn secs(&self) -> u64 {
        self.micros() / 1_000_000
    }
}

/// Thread-sleeping [`DelayNs`](embedded_hal::delay::DelayNs) for host builds.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl embedded_hal::delay::DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

/// `embassy-time` driver over `esp_timer` (1 MHz ticks).
#[cfg(target_os = "espidf")]
mod esp_timer_driver {
    use core::task::Waker;
    use core::time::Duration;

    use embassy_time_driver::Driver;

    /// Stack of the one-shot wake thread.
    const WAKE_STACK: usize = 2048;

    struct EspTimerDriver;

    impl Driver for EspTimerDriver {
        fn now(&self) -> u64 {
            // SAFETY: esp_timer_get_time reads the RTC-backed high-res counter.
            (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
        }

        fn schedule_wake(&self, at: u64, waker: &Waker) {
            if at == u64::MAX {
                return;
            }
            let now = self.now();
            if at <= now {
                waker.wake_by_ref();
                return;
            }
            let wake = waker.clone();
            let spawned = std::thread::Builder::new()
                .stack_size(WAKE_STACK)
                .spawn(move || {
                    std::thread::sleep(Duration::from_micros(at - now));
                    wake.wake();
                });
            if spawned.is_err() {
                // Early wake: the timer re-polls and re-arms.
                waker.wake_by_ref();
            }
        }
    }

    embassy_time_driver::time_driver_impl!(static DRIVER: EspTimerDriver = EspTimerDriver);
}
