use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant as HostInstant;

use crossterm::style::Stylize;
use embassy_futures::block_on;

use sensor_core::delivery::{DeliveryCoordinator, DeliveryPhase, NotifyOutcome, PushTransport};
use sensor_core::filter::SampleFilter;
use sensor_core::notices;
use sensor_core::power::{PowerControl, PowerMode};
use sensor_core::status::{Severity, StatusSink};
use sensor_core::trigger::{Edge, HysteresisTrigger, Sample};
use sensor_core::wire::{LinkCredentials, PushCredentials};

const FILTER_DEPTH: usize = 8;
const LOWER_THRESHOLD: Sample = 3_000;
const UPPER_THRESHOLD: Sample = 10_000;

const LINK: LinkCredentials<'static> = LinkCredentials {
    ssid: "emulated-ap",
    passphrase: "emulated-pass",
};

const PUSH: PushCredentials<'static> = PushCredentials {
    token: "demo-token",
    user: "demo-user",
};

pub const HELP_TOPICS: &[(&str, &str)] = &[
    ("sample", "sample <0-65535>         - feed one raw light reading"),
    ("ramp", "ramp <from> <to> <steps>  - feed a linear reading sweep"),
    ("reseed", "reseed <0-65535>         - wake-style filter restart"),
    ("link", "link <up|down>            - toggle access point availability"),
    (
        "outcome",
        "outcome <ok|fail>         - script the next send result",
    ),
    ("status", "status                    - show node state"),
    ("help", "help                      - show this list"),
];

/// Wireless link fault injected by the session's scripting commands.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EmulatedFault;

/// Transport whose connect/send outcomes are scripted from the prompt.
pub struct ScriptedTransport {
    pub link_available: bool,
    pub fail_next_send: bool,
    connected: bool,
    connect_attempts: usize,
    sent: Vec<String>,
}

impl ScriptedTransport {
    fn new() -> Self {
        Self {
            link_available: true,
            fail_next_send: false,
            connected: false,
            connect_attempts: 0,
            sent: Vec::new(),
        }
    }

    fn sent(&self) -> &[String] {
        &self.sent
    }
}

impl PushTransport for ScriptedTransport {
    type Error = EmulatedFault;

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn connect(&mut self, _: &LinkCredentials<'_>) -> Result<(), EmulatedFault> {
        self.connect_attempts += 1;
        if self.link_available {
            self.connected = true;
            Ok(())
        } else {
            Err(EmulatedFault)
        }
    }

    async fn send(&mut self, body: &str) -> Result<(), EmulatedFault> {
        if self.fail_next_send {
            self.fail_next_send = false;
            return Err(EmulatedFault);
        }

        self.sent.push(body.to_string());
        Ok(())
    }
}

/// Cloneable power handle shared between the session and the coordinator.
#[derive(Clone)]
pub struct HostPower {
    mode: Rc<Cell<PowerMode>>,
}

impl HostPower {
    fn new() -> Self {
        Self {
            mode: Rc::new(Cell::new(PowerMode::Active)),
        }
    }

    fn mode(&self) -> PowerMode {
        self.mode.get()
    }
}

impl PowerControl for HostPower {
    fn activate(&self) {
        self.mode.set(PowerMode::Active);
    }

    fn release(&self) {
        self.mode.set(PowerMode::Idle);
    }
}

/// Status sink that buffers colored lines for the session to print.
#[derive(Clone)]
pub struct BufferedStatus {
    lines: Rc<RefCell<Vec<String>>>,
}

impl BufferedStatus {
    fn new(lines: Rc<RefCell<Vec<String>>>) -> Self {
        Self { lines }
    }
}

impl StatusSink for BufferedStatus {
    fn set_status(&self, text: &'static str, severity: Severity) {
        let rendered = match severity {
            Severity::Info => format!("status: {text}"),
            Severity::Good => format!("status: {}", text.green()),
            Severity::Error => format!("status: {}", text.red()),
        };
        self.lines.borrow_mut().push(rendered);
    }
}

type HostCoordinator =
    DeliveryCoordinator<'static, ScriptedTransport, HostPower, BufferedStatus, HostInstant>;

pub struct Session {
    filter: SampleFilter<FILTER_DEPTH>,
    trigger: HysteresisTrigger,
    coordinator: HostCoordinator,
    power: HostPower,
    status_lines: Rc<RefCell<Vec<String>>>,
    displayed_value: Sample,
}

impl Session {
    pub fn new() -> Self {
        let power = HostPower::new();
        let status_lines = Rc::new(RefCell::new(Vec::new()));
        let status = BufferedStatus::new(Rc::clone(&status_lines));
        let coordinator = DeliveryCoordinator::new(
            ScriptedTransport::new(),
            power.clone(),
            status,
            LINK,
            PUSH,
        );

        Self {
            filter: SampleFilter::new(),
            trigger: HysteresisTrigger::new(LOWER_THRESHOLD, UPPER_THRESHOLD)
                .expect("emulator threshold band"),
            coordinator,
            power,
            status_lines,
            displayed_value: 0,
        }
    }

    pub fn handle_command(&mut self, line: &str) -> Vec<String> {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let arguments: Vec<&str> = parts.collect();

        match command.to_ascii_lowercase().as_str() {
            "sample" => match parse_sample(&arguments) {
                Ok(raw) => self.feed(raw),
                Err(message) => vec![message],
            },
            "ramp" => match parse_ramp(&arguments) {
                Ok((from, to, steps)) => self.ramp(from, to, steps),
                Err(message) => vec![message],
            },
            "reseed" => match parse_sample(&arguments) {
                Ok(raw) => self.reseed(raw),
                Err(message) => vec![message],
            },
            "link" => self.set_link(&arguments),
            "outcome" => self.set_outcome(&arguments),
            "status" => self.render_status(),
            "help" => HELP_TOPICS
                .iter()
                .map(|(_, description)| (*description).to_string())
                .collect(),
            _ => vec![format!("ERR unknown command `{command}`; try `help`")],
        }
    }

    fn feed(&mut self, raw: Sample) -> Vec<String> {
        let value = self.filter.update(raw);
        self.displayed_value = value;
        let mut lines = vec![format!("value {value:05}")];

        if let Some(edge) = self.trigger.check(value) {
            lines.push(describe_edge(edge));

            let notice = notices::notice_for(edge);
            let outcome = block_on(self.coordinator.notify(
                notice.title,
                notice.message,
                HostInstant::now(),
            ));

            lines.append(&mut self.status_lines.borrow_mut());
            lines.push(describe_outcome(outcome));
        }

        lines
    }

    fn ramp(&mut self, from: Sample, to: Sample, steps: u16) -> Vec<String> {
        let mut lines = Vec::new();
        let span = i32::from(to) - i32::from(from);
        let last = i32::from(steps.max(2)) - 1;

        for step in 0..=last {
            let raw = i32::from(from) + span * step / last;
            let raw = Sample::try_from(raw).unwrap_or_default();
            lines.append(&mut self.feed(raw));
        }

        lines
    }

    fn reseed(&mut self, raw: Sample) -> Vec<String> {
        let value = self.filter.reseed(raw);
        self.displayed_value = value;
        // Wake path: the node refreshes the display and goes idle-eligible.
        self.power.release();
        vec![format!("reseeded; value {value:05}")]
    }

    fn set_link(&mut self, arguments: &[&str]) -> Vec<String> {
        match arguments {
            ["up"] => {
                self.coordinator.transport_mut().link_available = true;
                vec!["access point available".to_string()]
            }
            ["down"] => {
                let transport = self.coordinator.transport_mut();
                transport.link_available = false;
                transport.connected = false;
                vec!["access point unavailable; link dropped".to_string()]
            }
            _ => vec!["ERR usage: link <up|down>".to_string()],
        }
    }

    fn set_outcome(&mut self, arguments: &[&str]) -> Vec<String> {
        match arguments {
            ["ok"] => {
                self.coordinator.transport_mut().fail_next_send = false;
                vec!["next send will succeed".to_string()]
            }
            ["fail"] => {
                self.coordinator.transport_mut().fail_next_send = true;
                vec!["next send will fail".to_string()]
            }
            _ => vec!["ERR usage: outcome <ok|fail>".to_string()],
        }
    }

    fn render_status(&self) -> Vec<String> {
        let transport = self.coordinator.transport();
        let mailbox = self.coordinator.mailbox();

        let armed = if self.trigger.armed() {
            "armed (level in range)".to_string()
        } else {
            format!("released ({})", "level low".red())
        };

        vec![
            format!(
                "trigger: {armed}, band {}..{}",
                self.trigger.lower(),
                self.trigger.upper()
            ),
            format!("value: {:05}", self.displayed_value),
            format!(
                "mailbox: current={}, pending={}",
                mailbox.current().map_or("-", |n| n.title),
                mailbox.pending().map_or("-", |n| n.title),
            ),
            format!("phase: {}", describe_phase(self.coordinator.phase())),
            format!("power: {:?}", self.power.mode()),
            format!(
                "link: {}, {}",
                if transport.is_connected() {
                    "joined"
                } else {
                    "down"
                },
                if transport.link_available {
                    "ap available"
                } else {
                    "ap unavailable"
                },
            ),
            format!(
                "sent: {} ({} connect attempts)",
                transport.sent().len(),
                transport.connect_attempts,
            ),
        ]
    }
}

fn parse_sample(arguments: &[&str]) -> Result<Sample, String> {
    match arguments {
        [value] => value
            .parse::<Sample>()
            .map_err(|_| format!("ERR `{value}` is not a reading in 0..=65535")),
        _ => Err("ERR expected exactly one reading".to_string()),
    }
}

fn parse_ramp(arguments: &[&str]) -> Result<(Sample, Sample, u16), String> {
    match arguments {
        [from, to, steps] => {
            let from = from
                .parse::<Sample>()
                .map_err(|_| format!("ERR `{from}` is not a reading"))?;
            let to = to
                .parse::<Sample>()
                .map_err(|_| format!("ERR `{to}` is not a reading"))?;
            let steps = steps
                .parse::<u16>()
                .map_err(|_| format!("ERR `{steps}` is not a step count"))?;
            Ok((from, to, steps))
        }
        _ => Err("ERR usage: ramp <from> <to> <steps>".to_string()),
    }
}

fn describe_edge(edge: Edge) -> String {
    match edge {
        Edge::RoseAboveUpper => format!("edge: {}", "rose above upper threshold".green()),
        Edge::FellBelowLower => format!("edge: {}", "fell below lower threshold".red()),
    }
}

fn describe_outcome(outcome: NotifyOutcome) -> String {
    match outcome {
        NotifyOutcome::Delivered => format!("push: {}", "delivered".green()),
        NotifyOutcome::LinkDown => format!("push: {}", "link down, kept for next event".red()),
        NotifyOutcome::SendFailed => format!("push: {}", "send failed".red()),
        NotifyOutcome::Coalesced => "push: coalesced behind active send".to_string(),
    }
}

fn describe_phase(phase: DeliveryPhase) -> &'static str {
    match phase {
        DeliveryPhase::Idle => "idle",
        DeliveryPhase::Connecting => "connecting",
        DeliveryPhase::Sending => "sending",
    }
}
