//! Domain models for per-peer traffic accounting.
//!
//! This module contains the core types that are independent
//! of capture or presentation concerns.

mod frame;
mod host;

pub use frame::{HandshakeKind, HandshakeMessage, HttpRequest, Ipv4Layer, ParsedFrame};
pub use host::{Direction, HostRecord};
