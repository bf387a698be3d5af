#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Dim-level power saver.
//!
//! One atomic flag tracks whether the node may dim. `activate`/`release`
//! are idempotent, so the sampling, delivery, and status paths call them
//! redundantly without coordination.

use portable_atomic::{AtomicBool, Ordering};
use sensor_core::power::{PowerControl, PowerMode};

/// Process-wide power-saving state shared by every task.
pub struct PowerSaver {
    dimmed: AtomicBool,
}

impl PowerSaver {
    /// Creates a power saver in the active (undimmed) state.
    pub const fn new() -> Self {
        Self {
            dimmed: AtomicBool::new(false),
        }
    }

    /// Current power mode.
    pub fn mode(&self) -> PowerMode {
        if self.dimmed.load(Ordering::Relaxed) {
            PowerMode::Idle
        } else {
            PowerMode::Active
        }
    }
}

impl PowerControl for PowerSaver {
    fn activate(&self) {
        if self.dimmed.swap(false, Ordering::Relaxed) {
            log_power_transition(PowerMode::Active);
        }
    }

    fn release(&self) {
        if !self.dimmed.swap(true, Ordering::Relaxed) {
            log_power_transition(PowerMode::Idle);
        }
    }
}

impl Default for PowerSaver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "none")]
fn log_power_transition(mode: PowerMode) {
    match mode {
        PowerMode::Active => defmt::info!("power: active"),
        PowerMode::Idle => defmt::info!("power: idle"),
    }
}

#[cfg(not(target_os = "none"))]
fn log_power_transition(mode: PowerMode) {
    println!("power: {mode:?}");
}
