//! Peer name discovery from HTTP Host headers and TLS SNI.

use tracing::{debug, info};

use crate::domain::{HostRecord, ParsedFrame};
use crate::error::{Layer, ParseError};

/// Where a discovered name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    HttpHost,
    TlsServerName,
}

/// Fills in a peer's display name from the first frame that reveals it.
///
/// Names are written once: after a record has a name, later frames are
/// not inspected at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostnameResolver;

impl HostnameResolver {
    pub fn new() -> Self {
        Self
    }

    /// Try to name `record` from `frame`.
    ///
    /// Returns the source of the name if one was written.
    pub fn resolve(&self, record: &mut HostRecord, frame: &ParsedFrame) -> Option<NameSource> {
        if record.is_named() {
            return None;
        }

        let (name, source) = self.discover(frame)?;

        if !record.set_name_once(name) {
            return None;
        }

        match source {
            NameSource::HttpHost => info!("HTTP host name detected: {}", record.display_name),
            NameSource::TlsServerName => {
                info!("HTTPS host name detected: {}", record.display_name)
            }
        }
        Some(source)
    }

    /// Find a name in the frame without touching any record.
    ///
    /// An HTTP Host header wins over TLS. Within TLS the whole handshake
    /// chain is walked and the first ClientHello carrying SNI is used.
    pub fn discover<'a>(&self, frame: &'a ParsedFrame) -> Option<(&'a str, NameSource)> {
        if let Ok(Some(host)) = http_host(frame) {
            return Some((host, NameSource::HttpHost));
        }

        match tls_server_name(frame) {
            Ok(Some(name)) => Some((name, NameSource::TlsServerName)),
            Ok(None) => {
                debug!("TLS handshake without SNI, resolution deferred");
                None
            }
            Err(_) => None,
        }
    }
}

/// Non-empty Host header of the frame's HTTP request.
fn http_host(frame: &ParsedFrame) -> Result<Option<&str>, ParseError> {
    let request = frame
        .http_request
        .as_ref()
        .ok_or(ParseError::Absent(Layer::HttpRequest))?;

    let host = request
        .host
        .as_deref()
        .map(str::trim)
        .filter(|host| !host.is_empty());
    if host.is_none() {
        debug!("{} request without Host header, resolution deferred", request.method);
    }
    Ok(host)
}

/// SNI host name of the first ClientHello in the handshake chain that has one.
fn tls_server_name(frame: &ParsedFrame) -> Result<Option<&str>, ParseError> {
    if frame.tls_handshakes.is_empty() {
        return Err(ParseError::Absent(Layer::TlsHandshake));
    }

    Ok(frame
        .tls_handshakes
        .iter()
        .filter(|message| message.is_client_hello())
        .filter_map(|message| message.server_name.as_deref())
        .find(|name| !name.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HandshakeKind, HandshakeMessage};
    use std::net::Ipv4Addr;

    fn frame() -> ParsedFrame {
        ParsedFrame::new(100).with_ipv4(Ipv4Addr::LOCALHOST, Ipv4Addr::new(10, 0, 0, 5))
    }

    #[test]
    fn test_http_host() {
        let mut record = HostRecord::new("10.0.0.5");
        let frame = frame().with_http_request("GET", Some("a.example"));

        assert_eq!(
            HostnameResolver::new().resolve(&mut record, &frame),
            Some(NameSource::HttpHost)
        );
        assert_eq!(record.display_name, "a.example");
    }

    #[test]
    fn test_write_once() {
        let resolver = HostnameResolver::new();
        let mut record = HostRecord::new("10.0.0.5");

        resolver.resolve(&mut record, &frame().with_http_request("GET", Some("a.example")));
        let second =
            resolver.resolve(&mut record, &frame().with_http_request("GET", Some("b.example")));

        assert_eq!(second, None);
        assert_eq!(record.display_name, "a.example");
    }

    #[test]
    fn test_sni_found_in_second_handshake_message() {
        let mut record = HostRecord::new("10.0.0.5");
        let frame = frame()
            .with_handshake(HandshakeMessage::new(HandshakeKind::ServerHello))
            .with_handshake(HandshakeMessage::client_hello(Some("secure.example")));

        assert_eq!(
            HostnameResolver::new().resolve(&mut record, &frame),
            Some(NameSource::TlsServerName)
        );
        assert_eq!(record.display_name, "secure.example");
    }

    #[test]
    fn test_first_client_hello_with_sni_wins() {
        let frame = frame()
            .with_handshake(HandshakeMessage::client_hello(None))
            .with_handshake(HandshakeMessage::client_hello(Some("first.example")))
            .with_handshake(HandshakeMessage::client_hello(Some("second.example")));

        assert_eq!(
            HostnameResolver::new().discover(&frame),
            Some(("first.example", NameSource::TlsServerName))
        );
    }

    #[test]
    fn test_http_wins_over_tls() {
        let frame = frame()
            .with_http_request("GET", Some("plain.example"))
            .with_handshake(HandshakeMessage::client_hello(Some("secure.example")));

        assert_eq!(
            HostnameResolver::new().discover(&frame),
            Some(("plain.example", NameSource::HttpHost))
        );
    }

    #[test]
    fn test_empty_host_falls_through() {
        let frame = frame()
            .with_http_request("GET", Some("  "))
            .with_handshake(HandshakeMessage::client_hello(Some("secure.example")));

        assert_eq!(
            HostnameResolver::new().discover(&frame),
            Some(("secure.example", NameSource::TlsServerName))
        );
    }

    #[test]
    fn test_deferred_when_nothing_found() {
        let resolver = HostnameResolver::new();
        let mut record = HostRecord::new("10.0.0.5");

        assert_eq!(resolver.resolve(&mut record, &frame()), None);
        assert_eq!(resolver.resolve(&mut record, &frame().with_http_request("GET", None)), None);
        assert_eq!(
            resolver.resolve(
                &mut record,
                &frame().with_handshake(HandshakeMessage::client_hello(None))
            ),
            None
        );
        assert!(!record.is_named());

        // a later frame can still name the peer
        resolver.resolve(
            &mut record,
            &frame().with_handshake(HandshakeMessage::client_hello(Some("late.example"))),
        );
        assert_eq!(record.display_name, "late.example");
    }
}
