use embassy_time::Instant;

use sensor_core::delivery::{DeliveryCoordinator, NotifyOutcome};

use crate::net::modem::AtModem;
use crate::notify::NotifyReceiver;
use crate::power::PowerSaver;
use crate::status::SignalStatus;

/// Coordinator bound to the firmware's transport, power, and status types.
pub type FirmwareCoordinator = DeliveryCoordinator<
    'static,
    AtModem<'static>,
    &'static PowerSaver,
    SignalStatus<'static>,
    Instant,
>;

#[embassy_executor::task]
pub async fn run(mut coordinator: FirmwareCoordinator, requests: NotifyReceiver<'static>) -> ! {
    loop {
        let request = requests.receive().await;
        defmt::info!("pushing '{=str}'", request.notice.title);

        let outcome = coordinator
            .notify(request.notice.title, request.notice.message, request.raised_at)
            .await;

        match outcome {
            NotifyOutcome::Delivered => defmt::info!("notification sent"),
            NotifyOutcome::Coalesced => defmt::info!("notification queued behind active send"),
            NotifyOutcome::LinkDown => {
                defmt::warn!("wifi connect error; notification kept for the next event");
            }
            NotifyOutcome::SendFailed => defmt::warn!("push send failed"),
        }
    }
}
