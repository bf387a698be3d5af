#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Notification intake shared between the sampling and delivery tasks.

#[cfg(not(target_os = "none"))]
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
#[cfg(target_os = "none")]
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::Instant;

use sensor_core::notices::Notice;

#[cfg(target_os = "none")]
type NotifyMutex = ThreadModeRawMutex;
#[cfg(not(target_os = "none"))]
type NotifyMutex = NoopRawMutex;

/// Depth of the notify queue between the sample loop and the delivery task.
///
/// The mailbox coalesces anything beyond one in-flight and one pending
/// notification, so the queue only needs to absorb scheduling jitter.
pub const NOTIFY_QUEUE_DEPTH: usize = 2;

/// Request to push one notice, raised by the sample loop.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct NotifyRequest {
    pub notice: Notice,
    pub raised_at: Instant,
}

/// Queue carrying notify requests to the delivery task.
pub type NotifyQueue = Channel<NotifyMutex, NotifyRequest, NOTIFY_QUEUE_DEPTH>;

/// Sender handle for the notify queue.
pub type NotifySender<'a> = Sender<'a, NotifyMutex, NotifyRequest, NOTIFY_QUEUE_DEPTH>;

/// Receiver handle for the notify queue.
pub type NotifyReceiver<'a> = Receiver<'a, NotifyMutex, NotifyRequest, NOTIFY_QUEUE_DEPTH>;
