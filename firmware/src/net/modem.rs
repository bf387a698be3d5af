//! AT-command Wi-Fi modem driver.
//!
//! Drives the UART-attached modem through the minimal command set the node
//! needs: join the access point, open one TCP connection to the push
//! service, upload the HTTP POST, and classify the reply lines. The
//! delivery coordinator owns this driver through the `PushTransport` seam
//! and never sees AT syntax.

#![cfg(target_os = "none")]

use core::fmt::{self, Write as _};

use embassy_stm32::usart::BufferedUart;
use embassy_time::{Duration, with_timeout};
use embedded_io_async::{Read, Write};
use heapless::String;

use sensor_core::delivery::PushTransport;
use sensor_core::wire::reply::{self, HttpStatus, ModemReply};
use sensor_core::wire::{self, LinkCredentials};

/// Longest reply line retained for classification; overflow is dropped.
const LINE_CAPACITY: usize = 128;

/// Capacity for a single AT command line.
const COMMAND_CAPACITY: usize = 128;

/// Capacity for the full HTTP request (head plus encoded body).
const REQUEST_CAPACITY: usize = 640;

/// Deadline for ordinary command acknowledgements.
const REPLY_TIMEOUT: Duration = Duration::from_secs(10);

/// Joining an access point can take considerably longer than a command ack.
const JOIN_TIMEOUT: Duration = Duration::from_secs(20);

/// Failure detail surfaced to the delivery coordinator.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ModemError {
    /// UART transfer failed.
    Io,
    /// The modem rejected a command.
    Rejected,
    /// No reply arrived within the deadline.
    Timeout,
    /// A command or request did not fit its buffer.
    Encode,
    /// The response ended before an HTTP status line appeared.
    MalformedResponse,
    /// The service answered with a non-success HTTP status.
    PushRefused(u16),
}

impl fmt::Display for ModemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModemError::Io => write!(f, "uart transfer failed"),
            ModemError::Rejected => write!(f, "modem rejected the command"),
            ModemError::Timeout => write!(f, "modem reply timed out"),
            ModemError::Encode => write!(f, "command buffer overflow"),
            ModemError::MalformedResponse => write!(f, "no http status in response"),
            ModemError::PushRefused(code) => write!(f, "push service answered {code}"),
        }
    }
}

/// Wi-Fi modem on the dedicated UART.
pub struct AtModem<'d> {
    uart: BufferedUart<'d>,
    joined: bool,
}

impl<'d> AtModem<'d> {
    /// Wraps an already-configured UART; the link starts unjoined.
    pub fn new(uart: BufferedUart<'d>) -> Self {
        Self {
            uart,
            joined: false,
        }
    }

    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), ModemError> {
        self.uart.write_all(bytes).await.map_err(|_| ModemError::Io)
    }

    async fn read_byte(&mut self) -> Result<u8, ModemError> {
        let mut byte = [0u8; 1];
        loop {
            let read = self
                .uart
                .read(&mut byte)
                .await
                .map_err(|_| ModemError::Io)?;
            if read == 1 {
                return Ok(byte[0]);
            }
        }
    }

    /// Reads one CR/LF-terminated line, keeping at most the prefix that
    /// fits the classification buffer.
    async fn read_line(&mut self, line: &mut String<LINE_CAPACITY>) -> Result<(), ModemError> {
        line.clear();
        loop {
            match self.read_byte().await? {
                b'\n' => return Ok(()),
                b'\r' => {}
                byte => {
                    let _ = line.push(byte as char);
                }
            }
        }
    }

    /// Waits for a terminal OK/ERROR reply, skipping echoes and chatter.
    async fn await_ack(&mut self, deadline: Duration) -> Result<(), ModemError> {
        with_timeout(deadline, async {
            let mut line = String::new();
            loop {
                self.read_line(&mut line).await?;
                match reply::classify(&line) {
                    Some(ModemReply::Ok | ModemReply::SendOk) => return Ok(()),
                    Some(ModemReply::Error) => return Err(ModemError::Rejected),
                    _ => {}
                }
            }
        })
        .await
        .map_err(|_| ModemError::Timeout)?
    }

    async fn command(&mut self, line: &str, deadline: Duration) -> Result<(), ModemError> {
        self.write_all(line.as_bytes()).await?;
        self.write_all(b"\r\n").await?;
        self.await_ack(deadline).await
    }

    /// Waits for the `>` prompt that precedes a payload upload.
    async fn await_prompt(&mut self) -> Result<(), ModemError> {
        with_timeout(REPLY_TIMEOUT, async {
            loop {
                if self.read_byte().await? == b'>' {
                    return Ok(());
                }
            }
        })
        .await
        .map_err(|_| ModemError::Timeout)?
    }

    /// Reads reply lines until the HTTP status inside a data header arrives.
    async fn await_push_status(&mut self) -> Result<HttpStatus, ModemError> {
        with_timeout(REPLY_TIMEOUT, async {
            let mut line = String::new();
            loop {
                self.read_line(&mut line).await?;
                if let Some(ModemReply::Data { .. }) = reply::classify(&line) {
                    let Some((_, payload)) = line.split_once(':') else {
                        continue;
                    };
                    let mut payload = payload;
                    return reply::http_status_line(&mut payload)
                        .map_err(|_| ModemError::MalformedResponse);
                }
            }
        })
        .await
        .map_err(|_| ModemError::Timeout)?
    }
}

impl PushTransport for AtModem<'_> {
    type Error = ModemError;

    fn is_connected(&self) -> bool {
        self.joined
    }

    async fn connect(&mut self, credentials: &LinkCredentials<'_>) -> Result<(), ModemError> {
        let mut join: String<COMMAND_CAPACITY> = String::new();
        write!(
            join,
            "AT+CWJAP=\"{}\",\"{}\"",
            credentials.ssid, credentials.passphrase
        )
        .map_err(|_| ModemError::Encode)?;

        self.command(&join, JOIN_TIMEOUT).await?;
        self.joined = true;
        Ok(())
    }

    async fn send(&mut self, body: &str) -> Result<(), ModemError> {
        let mut open: String<COMMAND_CAPACITY> = String::new();
        write!(
            open,
            "AT+CIPSTART=\"TCP\",\"{}\",{}",
            wire::PUSH_HOST,
            wire::PUSH_PORT
        )
        .map_err(|_| ModemError::Encode)?;
        self.command(&open, REPLY_TIMEOUT).await?;

        let mut request: String<REQUEST_CAPACITY> = String::new();
        write!(
            request,
            "POST {path} HTTP/1.1\r\n\
             Host: {host}\r\n\
             Content-Type: application/x-www-form-urlencoded\r\n\
             Content-Length: {length}\r\n\
             Connection: close\r\n\
             \r\n\
             {body}",
            path = wire::PUSH_PATH,
            host = wire::PUSH_HOST,
            length = body.len(),
        )
        .map_err(|_| ModemError::Encode)?;

        let mut upload: String<COMMAND_CAPACITY> = String::new();
        write!(upload, "AT+CIPSEND={}", request.len()).map_err(|_| ModemError::Encode)?;
        self.write_all(upload.as_bytes()).await?;
        self.write_all(b"\r\n").await?;
        self.await_prompt().await?;

        self.write_all(request.as_bytes()).await?;
        self.await_ack(REPLY_TIMEOUT).await?;

        let status = self.await_push_status().await;

        // The service closes after `Connection: close`; an explicit close
        // keeps the modem's socket table clean regardless.
        let _ = self.command("AT+CIPCLOSE", REPLY_TIMEOUT).await;

        let status = status?;
        if status.is_success() {
            Ok(())
        } else {
            Err(ModemError::PushRefused(status.code()))
        }
    }
}
