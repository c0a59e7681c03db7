//! Log-based diagnostic sink adapter.
//!
//! Implements [`DiagnosticSink`] by forwarding each line to the `log`
//! facade, which the platform routes to the USB console in production.
//! Lines are formatted into a fixed buffer first; anything past
//! [`LINE_CAP`] bytes is cut rather than allocated.

use core::fmt::Write;

use log::info;

use crate::app::ports::DiagnosticSink;

/// Longest diagnostic line kept intact.
pub const LINE_CAP: usize = 128;

#[derive(Default)]
pub struct LogDiagnosticSink {
    lines: u64,
}

impl LogDiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines emitted so far.
    pub fn lines(&self) -> u64 {
        self.lines
    }
}

/// Format `args` into a bounded buffer, truncating on overflow.
pub fn render(args: core::fmt::Arguments<'_>) -> heapless::String<LINE_CAP> {
    let mut buf = Truncating(heapless::String::new());
    let _ = buf.write_fmt(args);
    buf.0
}

struct Truncating(heapless::String<LINE_CAP>);

impl Write for Truncating {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for ch in s.chars() {
            if self.0.push(ch).is_err() {
                return Err(core::fmt::Error);
            }
        }
        Ok(())
    }
}

impl DiagnosticSink for LogDiagnosticSink {
    fn log(&mut self, line: core::fmt::Arguments<'_>) {
        let rendered = render(line);
        info!("{}", rendered.trim_end());
        self.lines += 1;
    }
}
