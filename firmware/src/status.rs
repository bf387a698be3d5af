#![allow(dead_code)]

//! Shared status storage for the firmware target.
//!
//! A lightweight atomic mirrors the displayed sample value, while status
//! lines travel over a latest-wins signal to the expiry task; the single
//! status label never needs more than the most recent update.

#[cfg(not(target_os = "none"))]
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
#[cfg(target_os = "none")]
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicU16, Ordering};

use sensor_core::status::{Severity, StatusSink};
use sensor_core::trigger::Sample;

#[cfg(target_os = "none")]
type StatusMutex = ThreadModeRawMutex;
#[cfg(not(target_os = "none"))]
type StatusMutex = NoopRawMutex;

/// Latest smoothed sample shown on the value label.
static DISPLAYED_VALUE: AtomicU16 = AtomicU16::new(0);

/// Records the latest smoothed sample for the display.
pub fn record_sample_value(value: Sample) {
    DISPLAYED_VALUE.store(value, Ordering::Relaxed);
}

/// Returns the most recent smoothed sample.
pub fn displayed_value() -> Sample {
    DISPLAYED_VALUE.load(Ordering::Relaxed)
}

/// Status line update published to the expiry task.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StatusUpdate {
    pub text: &'static str,
    pub severity: Severity,
}

/// Latest-wins channel carrying status line updates.
pub type StatusSignal = Signal<StatusMutex, StatusUpdate>;

/// `StatusSink` handle backed by the shared signal.
#[derive(Copy, Clone)]
pub struct SignalStatus<'a> {
    signal: &'a StatusSignal,
}

impl<'a> SignalStatus<'a> {
    /// Creates a sink publishing into `signal`.
    pub const fn new(signal: &'a StatusSignal) -> Self {
        Self { signal }
    }
}

impl StatusSink for SignalStatus<'_> {
    fn set_status(&self, text: &'static str, severity: Severity) {
        self.signal.signal(StatusUpdate { text, severity });
    }
}
