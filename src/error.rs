//! Error types for the traffic monitor.

use std::fmt;

use thiserror::Error;

/// Errors raised while opening or reading from the capture device.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("network interface not found: {0}")]
    InterfaceNotFound(String),

    #[error("failed to create capture channel: {0}")]
    ChannelCreation(String),

    #[error("insufficient permissions to capture packets (try running as root)")]
    InsufficientPermissions,
}

/// A protocol layer the analysis code looks for in a parsed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Ipv4,
    HttpRequest,
    TlsHandshake,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layer::Ipv4 => "IPv4",
            Layer::HttpRequest => "HTTP request",
            Layer::TlsHandshake => "TLS handshake",
        };
        f.write_str(name)
    }
}

/// Errors produced while analysing a frame.
///
/// These are always recoverable: the frame is skipped and capture goes on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{0} layer absent")]
    Absent(Layer),
}

/// Errors in command line configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid IPv4 address: {0}")]
    InvalidAddress(String),

    #[error("execution time was negative: {0}")]
    NegativeExecutionTime(i64),

    #[error("update period must be positive, got {0}")]
    InvalidUpdatePeriod(i64),

    #[error("no interface with an IPv4 address found, use --ip")]
    NoDefaultInterface,
}
