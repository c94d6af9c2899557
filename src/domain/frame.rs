//! Layer view of a captured frame.

use std::net::Ipv4Addr;

/// Source and destination of an IPv4 packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Layer {
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
}

/// The parts of an HTTP request line and headers we care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method, e.g. `GET`
    pub method: String,
    /// Value of the `Host` header, if the request carried one
    pub host: Option<String>,
}

/// TLS handshake message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeKind {
    HelloRequest,
    ClientHello,
    ServerHello,
    NewSessionTicket,
    Certificate,
    ServerKeyExchange,
    CertificateRequest,
    ServerHelloDone,
    CertificateVerify,
    ClientKeyExchange,
    Finished,
    Unknown(u8),
}

impl HandshakeKind {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => HandshakeKind::HelloRequest,
            1 => HandshakeKind::ClientHello,
            2 => HandshakeKind::ServerHello,
            4 => HandshakeKind::NewSessionTicket,
            11 => HandshakeKind::Certificate,
            12 => HandshakeKind::ServerKeyExchange,
            13 => HandshakeKind::CertificateRequest,
            14 => HandshakeKind::ServerHelloDone,
            15 => HandshakeKind::CertificateVerify,
            16 => HandshakeKind::ClientKeyExchange,
            20 => HandshakeKind::Finished,
            other => HandshakeKind::Unknown(other),
        }
    }
}

/// One TLS handshake message found in a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeMessage {
    pub kind: HandshakeKind,
    /// SNI host name; only ever set on a ClientHello.
    pub server_name: Option<String>,
}

impl HandshakeMessage {
    pub fn new(kind: HandshakeKind) -> Self {
        Self {
            kind,
            server_name: None,
        }
    }

    pub fn client_hello(server_name: Option<&str>) -> Self {
        Self {
            kind: HandshakeKind::ClientHello,
            server_name: server_name.map(str::to_string),
        }
    }

    pub fn is_client_hello(&self) -> bool {
        self.kind == HandshakeKind::ClientHello
    }
}

/// A captured frame decoded into the layers the analysis looks at.
///
/// Every layer is optional: a frame missing all of them is still a
/// valid input and is simply skipped by the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFrame {
    /// Total raw frame length in bytes
    pub length: usize,
    pub ipv4: Option<Ipv4Layer>,
    pub http_request: Option<HttpRequest>,
    /// Handshake messages in wire order, across all records of the segment
    pub tls_handshakes: Vec<HandshakeMessage>,
}

impl ParsedFrame {
    /// Create a frame of the given length with no layers.
    pub fn new(length: usize) -> Self {
        Self {
            length,
            ..Self::default()
        }
    }

    pub fn with_ipv4(mut self, source: Ipv4Addr, destination: Ipv4Addr) -> Self {
        self.ipv4 = Some(Ipv4Layer {
            source,
            destination,
        });
        self
    }

    pub fn with_http_request(mut self, method: &str, host: Option<&str>) -> Self {
        self.http_request = Some(HttpRequest {
            method: method.to_string(),
            host: host.map(str::to_string),
        });
        self
    }

    pub fn with_handshake(mut self, message: HandshakeMessage) -> Self {
        self.tls_handshakes.push(message);
        self
    }
}
