//! HTTP request detection.

use crate::domain::HttpRequest;

const METHODS: &[&str] = &[
    "GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS", "PATCH", "CONNECT", "TRACE",
];

/// Parse the start of an HTTP/1.x request from a TCP payload.
///
/// Returns `None` unless the payload begins with a request method. The
/// header block is scanned up to the first blank line or the end of the
/// segment, whichever comes first.
pub fn parse_request(payload: &[u8]) -> Option<HttpRequest> {
    let method = METHODS.iter().find(|m| {
        payload.len() > m.len() && payload.starts_with(m.as_bytes()) && payload[m.len()] == b' '
    })?;

    let text = String::from_utf8_lossy(payload);
    let head = text.split("\r\n\r\n").next().unwrap_or("");

    let host = head
        .lines()
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("host"))
        .map(|(_, value)| value.trim().to_string());

    Some(HttpRequest {
        method: method.to_string(),
        host,
    })
}
