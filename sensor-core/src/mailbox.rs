//! Two-slot outbound notification mailbox.
//!
//! The node serializes pushes to exactly one at a time. The notification
//! being transmitted sits in `current`; at most one newer event waits in
//! `pending`, and a still-newer event overwrites it (last-write-wins
//! coalescing). An empty slot is simply `None`.

/// Outbound push notification.
///
/// Timestamps stay generic so firmware and host tooling can attach their own
/// monotonic instant types.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Notification<I> {
    pub title: &'static str,
    pub message: &'static str,
    pub created_at: I,
}

impl<I> Notification<I> {
    /// Creates a notification stamped with its triggering instant.
    pub const fn new(title: &'static str, message: &'static str, created_at: I) -> Self {
        Self {
            title,
            message,
            created_at,
        }
    }
}

/// Outcome of queueing a notification.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Decision {
    /// The mailbox was idle; the caller should start a delivery attempt.
    SendNow,
    /// A delivery is outstanding; the notification waits in `pending`.
    Queued,
}

/// Holds the in-flight notification and at most one queued successor.
#[derive(Copy, Clone, Debug)]
pub struct Mailbox<I> {
    current: Option<Notification<I>>,
    pending: Option<Notification<I>>,
}

impl<I: Copy> Mailbox<I> {
    /// Creates an empty mailbox.
    pub const fn new() -> Self {
        Self {
            current: None,
            pending: None,
        }
    }

    /// Queues a notification, coalescing with any pending one.
    pub fn enqueue(&mut self, title: &'static str, message: &'static str, now: I) -> Decision {
        let notification = Notification::new(title, message, now);
        if self.current.is_none() {
            self.current = Some(notification);
            Decision::SendNow
        } else {
            // A newer event supersedes anything still waiting its turn.
            self.pending = Some(notification);
            Decision::Queued
        }
    }

    /// Finishes the in-flight delivery and promotes any pending notification.
    ///
    /// Returns the promoted notification so the caller can immediately start
    /// delivering it on the already-open link.
    pub fn complete_current(&mut self) -> Option<Notification<I>> {
        self.advance()
    }

    /// Abandons the in-flight delivery and promotes any pending notification.
    ///
    /// A failed notification is never re-queued as itself: a newer pending
    /// event takes over, and with nothing pending the failure is dropped.
    /// Known limitation: that drop is silent.
    pub fn fail_current(&mut self) -> Option<Notification<I>> {
        self.advance()
    }

    fn advance(&mut self) -> Option<Notification<I>> {
        self.current = self.pending.take();
        self.current
    }

    /// The notification currently being transmitted, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&Notification<I>> {
        self.current.as_ref()
    }

    /// The notification waiting its turn, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<&Notification<I>> {
        self.pending.as_ref()
    }

    /// Returns `true` while any slot still holds a notification.
    #[must_use]
    pub const fn has_work(&self) -> bool {
        self.current.is_some() || self.pending.is_some()
    }

    /// Returns `true` once both slots are clear.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.has_work()
    }
}

impl<I: Copy> Default for Mailbox<I> {
    fn default() -> Self {
        Self::new()
    }
}
