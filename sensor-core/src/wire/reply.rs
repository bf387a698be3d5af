//! Reply grammar for the modem link and the push service response.
//!
//! The delivery driver needs just enough parsing to classify modem
//! acknowledgements and the HTTP status line of the service response.
//! `winnow` combinators keep both bounded and allocation-free.

use winnow::ascii::dec_uint;
use winnow::combinator::{alt, delimited};
use winnow::prelude::*;

/// Classified reply line from the serial modem.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ModemReply {
    /// Command accepted.
    Ok,
    /// Command rejected.
    Error,
    /// Payload transmission acknowledged.
    SendOk,
    /// Inbound data header announcing `len` payload bytes.
    Data { len: usize },
}

/// Parses one modem reply marker at the start of `input`.
pub fn modem_reply(input: &mut &str) -> ModalResult<ModemReply> {
    alt((
        "SEND OK".value(ModemReply::SendOk),
        "OK".value(ModemReply::Ok),
        "ERROR".value(ModemReply::Error),
        delimited("+IPD,", dec_uint, ":").map(|len: u32| ModemReply::Data { len: len as usize }),
    ))
    .parse_next(input)
}

/// Classifies a full reply line, tolerating surrounding whitespace.
///
/// Returns `None` for command echoes and unsolicited lines the driver
/// should skip.
#[must_use]
pub fn classify(line: &str) -> Option<ModemReply> {
    let mut input = line.trim();
    let reply = modem_reply(&mut input).ok()?;
    match reply {
        // A data header is followed by the payload on the same line.
        ModemReply::Data { .. } => Some(reply),
        _ if input.is_empty() => Some(reply),
        _ => None,
    }
}

/// Numeric status parsed from the first HTTP response line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct HttpStatus {
    code: u16,
}

impl HttpStatus {
    /// Raw status code.
    #[must_use]
    pub const fn code(self) -> u16 {
        self.code
    }

    /// The service acknowledged the message (2xx).
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.code >= 200 && self.code < 300
    }
}

/// Parses `HTTP/<major>.<minor> <code> <reason>`.
pub fn http_status_line(input: &mut &str) -> ModalResult<HttpStatus> {
    let _version = ("HTTP/", dec_uint::<_, u8, _>, '.', dec_uint::<_, u8, _>).parse_next(input)?;
    let code = delimited(' ', dec_uint, ' ').parse_next(input)?;
    Ok(HttpStatus { code })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_plain_acknowledgements() {
        assert_eq!(classify("OK"), Some(ModemReply::Ok));
        assert_eq!(classify("ERROR"), Some(ModemReply::Error));
        assert_eq!(classify("SEND OK"), Some(ModemReply::SendOk));
        assert_eq!(classify("  OK\r"), Some(ModemReply::Ok));
    }

    #[test]
    fn classifies_data_headers_with_payload_attached() {
        assert_eq!(
            classify("+IPD,17:HTTP/1.1 200 OK\r"),
            Some(ModemReply::Data { len: 17 })
        );
    }

    #[test]
    fn skips_echoes_and_unsolicited_lines() {
        assert_eq!(classify("AT+CIPSEND=120"), None);
        assert_eq!(classify("WIFI GOT IP"), None);
        assert_eq!(classify("OKAY"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn parses_a_success_status_line() {
        let mut input = "HTTP/1.1 200 OK";
        let status = http_status_line(&mut input).expect("valid status line");
        assert_eq!(status.code(), 200);
        assert!(status.is_success());
    }

    #[test]
    fn parses_a_failure_status_line() {
        let mut input = "HTTP/1.1 400 Bad Request";
        let status = http_status_line(&mut input).expect("valid status line");
        assert_eq!(status.code(), 400);
        assert!(!status.is_success());
    }

    #[test]
    fn rejects_non_http_lines() {
        let mut input = "token=abc";
        assert!(http_status_line(&mut input).is_err());
    }
}
