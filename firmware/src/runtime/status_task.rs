use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Timer};

use sensor_core::power::PowerControl;
use sensor_core::status::{STATUS_CLEAR_DELAY, Severity};

use crate::power::PowerSaver;
use crate::status::{StatusSignal, StatusUpdate};

fn clear_delay() -> Duration {
    let micros = u64::try_from(STATUS_CLEAR_DELAY.as_micros()).unwrap_or(u64::MAX);
    Duration::from_micros(micros)
}

/// Shows each status line and clears it once the display window expires.
///
/// Every update restarts the expiry window; the clear releases the power
/// handle so a quiet node can dim again.
#[embassy_executor::task]
pub async fn run(signal: &'static StatusSignal, power: &'static PowerSaver) -> ! {
    loop {
        let mut update = signal.wait().await;

        loop {
            power.activate();
            show(update);

            match select(signal.wait(), Timer::after(clear_delay())).await {
                Either::First(next) => update = next,
                Either::Second(()) => {
                    defmt::info!("status cleared");
                    power.release();
                    break;
                }
            }
        }
    }
}

fn show(update: StatusUpdate) {
    match update.severity {
        Severity::Info => defmt::info!("status: {=str}", update.text),
        Severity::Good => defmt::info!("status(ok): {=str}", update.text),
        Severity::Error => defmt::warn!("status(err): {=str}", update.text),
    }
}
