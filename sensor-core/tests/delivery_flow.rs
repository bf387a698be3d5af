use core::cell::{Cell, RefCell};

use embassy_futures::block_on;
use heapless::Vec;

use sensor_core::delivery::{DeliveryCoordinator, DeliveryPhase, NotifyOutcome, PushTransport};
use sensor_core::notices;
use sensor_core::power::{PowerControl, PowerMode};
use sensor_core::status::{Severity, StatusSink};
use sensor_core::trigger::HysteresisTrigger;
use sensor_core::wire::{LinkCredentials, PushBody, PushCredentials};

const LINK: LinkCredentials<'static> = LinkCredentials {
    ssid: "coop-net",
    passphrase: "hunter2",
};

const PUSH: PushCredentials<'static> = PushCredentials {
    token: "app-token",
    user: "user-key",
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct TransportFault;

#[derive(Default)]
struct ScriptedTransport {
    connected: bool,
    link_available: bool,
    fail_sends: usize,
    connect_attempts: usize,
    sent: Vec<PushBody, 8>,
}

impl ScriptedTransport {
    fn disconnected(link_available: bool) -> Self {
        Self {
            link_available,
            ..Self::default()
        }
    }

    fn connected() -> Self {
        Self {
            connected: true,
            link_available: true,
            ..Self::default()
        }
    }
}

impl PushTransport for ScriptedTransport {
    type Error = TransportFault;

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn connect(&mut self, _: &LinkCredentials<'_>) -> Result<(), TransportFault> {
        self.connect_attempts += 1;
        if self.link_available {
            self.connected = true;
            Ok(())
        } else {
            Err(TransportFault)
        }
    }

    async fn send(&mut self, body: &str) -> Result<(), TransportFault> {
        let mut stored = PushBody::new();
        stored.push_str(body).expect("test body fits");
        self.sent.push(stored).expect("test send log capacity");

        if self.fail_sends > 0 {
            self.fail_sends -= 1;
            Err(TransportFault)
        } else {
            Ok(())
        }
    }
}

struct RecordingPower {
    mode: Cell<PowerMode>,
}

impl RecordingPower {
    fn new() -> Self {
        Self {
            mode: Cell::new(PowerMode::Idle),
        }
    }

    fn mode(&self) -> PowerMode {
        self.mode.get()
    }
}

impl PowerControl for RecordingPower {
    fn activate(&self) {
        self.mode.set(PowerMode::Active);
    }

    fn release(&self) {
        self.mode.set(PowerMode::Idle);
    }
}

#[derive(Default)]
struct RecordingStatus {
    lines: RefCell<std::vec::Vec<(&'static str, Severity)>>,
}

impl RecordingStatus {
    fn last(&self) -> Option<(&'static str, Severity)> {
        self.lines.borrow().last().copied()
    }

    fn texts(&self) -> std::vec::Vec<&'static str> {
        self.lines.borrow().iter().map(|(text, _)| *text).collect()
    }
}

impl StatusSink for RecordingStatus {
    fn set_status(&self, text: &'static str, severity: Severity) {
        self.lines.borrow_mut().push((text, severity));
    }
}

type TestCoordinator<'a> =
    DeliveryCoordinator<'a, ScriptedTransport, &'a RecordingPower, &'a RecordingStatus, u64>;

fn coordinator<'a>(
    transport: ScriptedTransport,
    power: &'a RecordingPower,
    status: &'a RecordingStatus,
) -> TestCoordinator<'a> {
    DeliveryCoordinator::new(transport, power, status, LINK, PUSH)
}

#[test]
fn sends_immediately_on_an_open_link() {
    let power = RecordingPower::new();
    let status = RecordingStatus::default();
    let mut coordinator = coordinator(ScriptedTransport::connected(), &power, &status);

    let outcome = block_on(coordinator.notify("Sensor OK!", "Light level is restored!", 10));

    assert_eq!(outcome, NotifyOutcome::Delivered);
    assert_eq!(coordinator.transport().connect_attempts, 0);
    assert_eq!(coordinator.transport().sent.len(), 1);
    assert!(coordinator.transport().sent[0].contains("title=Sensor OK!"));
    assert!(coordinator.mailbox().is_empty());
    assert_eq!(coordinator.phase(), DeliveryPhase::Idle);
    assert_eq!(power.mode(), PowerMode::Idle);
    assert_eq!(status.last(), Some(("sent!", Severity::Good)));
}

#[test]
fn connects_first_when_the_link_is_down() {
    let power = RecordingPower::new();
    let status = RecordingStatus::default();
    let mut coordinator = coordinator(ScriptedTransport::disconnected(true), &power, &status);

    let outcome = block_on(coordinator.notify("Sensor OK!", "Light level is restored!", 10));

    assert_eq!(outcome, NotifyOutcome::Delivered);
    assert_eq!(coordinator.transport().connect_attempts, 1);
    assert!(coordinator.transport().is_connected());
    assert!(status.texts().contains(&"initing wifi..."));
}

#[test]
fn link_failure_leaves_the_notification_outstanding() {
    let power = RecordingPower::new();
    let status = RecordingStatus::default();
    let mut coordinator = coordinator(ScriptedTransport::disconnected(false), &power, &status);

    let outcome = block_on(coordinator.notify("Sensor below threshold!", "msg", 10));

    assert_eq!(outcome, NotifyOutcome::LinkDown);
    assert!(coordinator.transport().sent.is_empty());
    assert_eq!(
        coordinator.mailbox().current().map(|n| n.title),
        Some("Sensor below threshold!")
    );
    assert_eq!(coordinator.phase(), DeliveryPhase::Idle);
    // Work is still outstanding, so the node must not go idle.
    assert_eq!(power.mode(), PowerMode::Active);
    assert_eq!(status.last(), Some(("wifi connect error!", Severity::Error)));
}

#[test]
fn next_event_restarts_a_stranded_delivery_and_drains_both() {
    let power = RecordingPower::new();
    let status = RecordingStatus::default();
    let mut coordinator = coordinator(ScriptedTransport::disconnected(false), &power, &status);

    let first = block_on(coordinator.notify("Sensor below threshold!", "low", 10));
    assert_eq!(first, NotifyOutcome::LinkDown);

    // The access point comes back before the next edge fires.
    coordinator.transport_mut().link_available = true;

    let second = block_on(coordinator.notify("Sensor OK!", "restored", 20));

    assert_eq!(second, NotifyOutcome::Delivered);
    let sent = &coordinator.transport().sent;
    assert_eq!(sent.len(), 2);
    assert!(sent[0].contains("title=Sensor below threshold!"));
    assert!(sent[1].contains("title=Sensor OK!"));
    assert!(coordinator.mailbox().is_empty());
    assert_eq!(power.mode(), PowerMode::Idle);
}

#[test]
fn send_failure_with_nothing_pending_drops_silently() {
    let power = RecordingPower::new();
    let status = RecordingStatus::default();
    let mut transport = ScriptedTransport::connected();
    transport.fail_sends = 1;
    let mut coordinator = coordinator(transport, &power, &status);

    let outcome = block_on(coordinator.notify("Sensor OK!", "restored", 10));

    assert_eq!(outcome, NotifyOutcome::SendFailed);
    assert_eq!(coordinator.transport().sent.len(), 1);
    // Documented loss case: no retry of the failed notification.
    assert!(coordinator.mailbox().is_empty());
    assert_eq!(power.mode(), PowerMode::Idle);
    assert_eq!(status.last(), Some(("http send error!", Severity::Error)));
}

#[test]
fn send_failure_promotes_the_pending_notification() {
    let power = RecordingPower::new();
    let status = RecordingStatus::default();
    let mut coordinator = coordinator(ScriptedTransport::disconnected(false), &power, &status);

    // Strand one notification, then queue a newer one behind it with the
    // first send scripted to fail.
    block_on(coordinator.notify("Sensor below threshold!", "low", 10));
    coordinator.transport_mut().link_available = true;
    coordinator.transport_mut().fail_sends = 1;

    let outcome = block_on(coordinator.notify("Sensor OK!", "restored", 20));

    assert_eq!(outcome, NotifyOutcome::SendFailed);
    let sent = &coordinator.transport().sent;
    assert_eq!(sent.len(), 2);
    assert!(sent[0].contains("title=Sensor below threshold!"));
    assert!(sent[1].contains("title=Sensor OK!"));
    assert!(coordinator.mailbox().is_empty());
}

#[test]
fn upper_crossing_delivers_the_recovery_notice_end_to_end() {
    let mut trigger = HysteresisTrigger::new(3_000, 10_000).expect("valid band");
    let power = RecordingPower::new();
    let status = RecordingStatus::default();
    let mut coordinator = coordinator(ScriptedTransport::disconnected(true), &power, &status);

    let mut now = 0u64;
    for sample in [0u16, 5_000, 9_999, 12_000, 11_000] {
        now += 1;
        if let Some(edge) = trigger.check(sample) {
            let notice = notices::notice_for(edge);
            let outcome = block_on(coordinator.notify(notice.title, notice.message, now));
            assert_eq!(outcome, NotifyOutcome::Delivered);
        }
    }

    assert_eq!(coordinator.transport().connect_attempts, 1);
    let sent = &coordinator.transport().sent;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("token=app-token"));
    assert!(sent[0].contains("user=user-key"));
    assert!(sent[0].contains("device=user-key"));
    assert!(sent[0].contains("title=Sensor OK!"));
    assert!(coordinator.mailbox().is_empty());
    assert_eq!(power.mode(), PowerMode::Idle);
}
