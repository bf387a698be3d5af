//! Status line vocabulary shared by the firmware display and the emulator.

use core::time::Duration;

/// How long a status line stays visible before it clears itself.
pub const STATUS_CLEAR_DELAY: Duration = Duration::from_millis(4_000);

/// Rendering severity for a status line; maps to display colors.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Severity {
    /// Neutral progress text.
    Info,
    /// Confirmation in the recovery color.
    Good,
    /// Failure in the alert color.
    Error,
}

/// Sink for human-readable status updates.
///
/// Implementations replace the previous line wholesale; expiry after
/// [`STATUS_CLEAR_DELAY`] is the sink owner's responsibility.
pub trait StatusSink {
    fn set_status(&self, text: &'static str, severity: Severity);
}

impl<T: StatusSink + ?Sized> StatusSink for &T {
    fn set_status(&self, text: &'static str, severity: Severity) {
        (**self).set_status(text, severity);
    }
}

/// Status sink that discards updates.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopStatus;

impl NoopStatus {
    /// Creates a new discarding sink.
    pub const fn new() -> Self {
        Self
    }
}

impl StatusSink for NoopStatus {
    fn set_status(&self, _: &'static str, _: Severity) {}
}
