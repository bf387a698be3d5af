//! Wire formats for the push notification service.

pub mod reply;

use core::fmt::{self, Write as _};

use heapless::String;

use crate::mailbox::Notification;

/// Hostname of the push service.
pub const PUSH_HOST: &str = "api.pushover.net";

/// TCP port for the plain-HTTP endpoint.
pub const PUSH_PORT: u16 = 80;

/// Message submission path.
pub const PUSH_PATH: &str = "/1/messages.json";

/// Capacity of the encoded form body.
pub const BODY_CAPACITY: usize = 384;

/// Encoded request body.
pub type PushBody = String<BODY_CAPACITY>;

/// Credentials identifying this node to the push service.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PushCredentials<'a> {
    pub token: &'a str,
    pub user: &'a str,
}

/// Credentials for joining the wireless access point.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LinkCredentials<'a> {
    pub ssid: &'a str,
    pub passphrase: &'a str,
}

/// Error raised when a notification does not fit the body buffer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BodyOverflow;

impl fmt::Display for BodyOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "encoded push body exceeds {BODY_CAPACITY} bytes")
    }
}

/// Encodes the form body for one notification.
///
/// The field order and the duplicated user id (sent as both `user` and
/// `device`) are the wire contract with the push service and must not
/// change. The notices are fixed ASCII strings, so no percent-escaping is
/// applied.
pub fn encode_body<I>(
    credentials: &PushCredentials<'_>,
    notification: &Notification<I>,
) -> Result<PushBody, BodyOverflow> {
    let mut body = PushBody::new();
    write!(
        body,
        "token={}&user={}&device={}&title={}&message={}",
        credentials.token,
        credentials.user,
        credentials.user,
        notification.title,
        notification.message,
    )
    .map_err(|fmt::Error| BodyOverflow)?;

    Ok(body)
}
