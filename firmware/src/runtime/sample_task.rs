use embassy_time::{Instant, Ticker};

use sensor_core::notices;
use sensor_core::power::PowerControl;
use sensor_core::status::{Severity, StatusSink};
use sensor_core::trigger::{Edge, Sample};

use crate::config;
use crate::hw::light::LightSensorAdc;
use crate::notify::{NotifyRequest, NotifySender};
use crate::power::PowerSaver;
use crate::sensing::{LightSource, SamplePipeline};
use crate::status::{self, SignalStatus};

#[embassy_executor::task]
pub async fn run(
    mut sensor: LightSensorAdc<'static>,
    mut pipeline: SamplePipeline,
    notify: NotifySender<'static>,
    status_line: SignalStatus<'static>,
    power: &'static PowerSaver,
) -> ! {
    // Wake-from-reset: restart the filter from one unfiltered sample and
    // refresh the display before the first scheduled tick.
    let seeded = pipeline.reseed(sensor.read_raw());
    status::record_sample_value(seeded);
    defmt::info!("sampling from seed {=u16}", seeded);
    power.release();

    let mut ticker = Ticker::every(config::SAMPLE_INTERVAL);
    loop {
        ticker.next().await;

        let report = pipeline.ingest(sensor.read_raw());
        status::record_sample_value(report.value);
        defmt::debug!("sample {=u16}", report.value);

        if let Some(edge) = report.edge {
            on_edge(edge, report.value, notify, status_line, power);
        }
    }
}

fn on_edge(
    edge: Edge,
    value: Sample,
    notify: NotifySender<'static>,
    status_line: SignalStatus<'static>,
    power: &'static PowerSaver,
) {
    power.activate();

    match edge {
        Edge::RoseAboveUpper => {
            defmt::info!("level restored at {=u16}", value);
            status_line.set_status("Level OK", Severity::Good);
        }
        Edge::FellBelowLower => {
            defmt::warn!("level below threshold at {=u16}", value);
            status_line.set_status("Below threshold!", Severity::Error);
        }
    }

    let request = NotifyRequest {
        notice: notices::notice_for(edge),
        raised_at: Instant::now(),
    };

    if notify.try_send(request).is_err() {
        // Only possible while the delivery task is wedged; the mailbox
        // would coalesce this event into its pending slot anyway.
        defmt::warn!("notify queue full; dropping {=str}", request.notice.title);
    }
}
