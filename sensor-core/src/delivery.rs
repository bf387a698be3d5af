//! Notification delivery coordination.
//!
//! Bridges the mailbox to the transport and power collaborators while
//! guaranteeing at most one outbound request in flight. One delivery
//! attempt moves `Idle → Connecting → Sending`; completion or failure
//! drains the pending slot on the already-open link before the node
//! returns to idle.

use crate::mailbox::{Decision, Mailbox, Notification};
use crate::power::PowerControl;
use crate::status::{Severity, StatusSink};
use crate::wire::{self, BodyOverflow, LinkCredentials, PushCredentials};

/// Phase of the in-flight delivery attempt.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DeliveryPhase {
    /// No transport activity outstanding.
    Idle,
    /// Waiting for the wireless link to come up.
    Connecting,
    /// A push request is on the wire.
    Sending,
}

/// Transport seam for the wireless link and the push request.
///
/// `send` resolving `Ok` means the push service acknowledged the request.
/// Link loss, rejected commands, and non-success statuses all surface as
/// the implementation's error type.
pub trait PushTransport {
    /// Transport-specific failure detail.
    type Error;

    /// Reports whether the link is already established.
    fn is_connected(&self) -> bool;

    /// Establishes the wireless link.
    async fn connect(&mut self, credentials: &LinkCredentials<'_>) -> Result<(), Self::Error>;

    /// Posts one encoded form body to the push service.
    async fn send(&mut self, body: &str) -> Result<(), Self::Error>;
}

/// Failure detail for one send attempt.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SendError<E> {
    /// The encoded body did not fit its buffer.
    Encode(BodyOverflow),
    /// The transport rejected or aborted the request.
    Transport(E),
}

/// Outcome reported for one `notify` call.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NotifyOutcome {
    /// The notification, and any successor promoted behind it, went out.
    Delivered,
    /// The wireless link could not be established; the notification stays
    /// current until the next triggering event restarts delivery.
    LinkDown,
    /// At least one send attempt failed mid-flight.
    SendFailed,
    /// A send was already outstanding; the notification was coalesced into
    /// the pending slot and will drain when the send resolves.
    Coalesced,
}

/// Drives the mailbox against the transport and power collaborators.
pub struct DeliveryCoordinator<'a, T, P, S, I> {
    mailbox: Mailbox<I>,
    phase: DeliveryPhase,
    transport: T,
    power: P,
    status: S,
    link: LinkCredentials<'a>,
    push: PushCredentials<'a>,
}

impl<'a, T, P, S, I> DeliveryCoordinator<'a, T, P, S, I>
where
    T: PushTransport,
    P: PowerControl,
    S: StatusSink,
    I: Copy,
{
    /// Creates an idle coordinator owning the transport connection.
    pub const fn new(
        transport: T,
        power: P,
        status: S,
        link: LinkCredentials<'a>,
        push: PushCredentials<'a>,
    ) -> Self {
        Self {
            mailbox: Mailbox::new(),
            phase: DeliveryPhase::Idle,
            transport,
            power,
            status,
            link,
            push,
        }
    }

    /// Queues a notification and drives delivery as far as it can go.
    ///
    /// At most one request is ever in flight: a notification arriving while
    /// a send is outstanding coalesces into the pending slot and is picked
    /// up when that send resolves. A notification stranded by an earlier
    /// link failure is retried here, since this call is the "next
    /// triggering event" the recovery policy waits for.
    pub async fn notify(
        &mut self,
        title: &'static str,
        message: &'static str,
        now: I,
    ) -> NotifyOutcome {
        match self.mailbox.enqueue(title, message, now) {
            Decision::Queued if self.phase != DeliveryPhase::Idle => NotifyOutcome::Coalesced,
            // `Queued` with the phase idle means the prior attempt died
            // before its send went out; restart delivery of the stranded
            // current notification.
            Decision::Queued | Decision::SendNow => self.deliver().await,
        }
    }

    async fn deliver(&mut self) -> NotifyOutcome {
        self.power.activate();

        if !self.transport.is_connected() {
            self.phase = DeliveryPhase::Connecting;
            self.status.set_status("initing wifi...", Severity::Info);

            if self.transport.connect(&self.link).await.is_err() {
                // Non-fatal: the current notification stays outstanding
                // until the next triggering event.
                self.phase = DeliveryPhase::Idle;
                self.status.set_status("wifi connect error!", Severity::Error);
                return NotifyOutcome::LinkDown;
            }
        }

        self.drain().await
    }

    /// Sends `current` and every notification promoted behind it.
    async fn drain(&mut self) -> NotifyOutcome {
        let mut failed = false;

        while let Some(notification) = self.mailbox.current().copied() {
            self.phase = DeliveryPhase::Sending;
            self.power.activate();
            self.status.set_status("sending notice...", Severity::Info);

            match self.send_one(&notification).await {
                Ok(()) => {
                    self.status.set_status("sent!", Severity::Good);
                    if self.mailbox.complete_current().is_none() {
                        break;
                    }
                }
                Err(_) => {
                    failed = true;
                    self.status.set_status("http send error!", Severity::Error);
                    // The failed notification is not retried as itself; a
                    // newer pending event takes over, otherwise it drops.
                    if self.mailbox.fail_current().is_none() {
                        break;
                    }
                }
            }
        }

        self.phase = DeliveryPhase::Idle;
        if self.mailbox.is_empty() {
            self.power.release();
        }

        if failed {
            NotifyOutcome::SendFailed
        } else {
            NotifyOutcome::Delivered
        }
    }

    async fn send_one(
        &mut self,
        notification: &Notification<I>,
    ) -> Result<(), SendError<T::Error>> {
        let body = wire::encode_body(&self.push, notification).map_err(SendError::Encode)?;
        self.transport
            .send(&body)
            .await
            .map_err(SendError::Transport)
    }

    /// Current delivery phase.
    #[must_use]
    pub const fn phase(&self) -> DeliveryPhase {
        self.phase
    }

    /// Read-only view of the mailbox slots.
    #[must_use]
    pub const fn mailbox(&self) -> &Mailbox<I> {
        &self.mailbox
    }

    /// Accesses the owned transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably accesses the owned transport.
    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
