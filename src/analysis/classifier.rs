//! Direction classification.

use std::net::Ipv4Addr;

use crate::domain::{Direction, ParsedFrame};
use crate::error::{Layer, ParseError};

/// Result of classifying one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// The remote end of the frame
    pub peer: Ipv4Addr,
    pub direction: Direction,
    /// Raw frame length in bytes
    pub size: u64,
}

/// Attributes frames to a peer relative to the monitored address.
///
/// Stateless: every frame is classified on its own.
#[derive(Debug, Clone, Copy)]
pub struct PacketClassifier {
    local: Ipv4Addr,
}

impl PacketClassifier {
    /// Create a classifier for the interface owning `local`.
    pub fn new(local: Ipv4Addr) -> Self {
        Self { local }
    }

    pub fn local_address(&self) -> Ipv4Addr {
        self.local
    }

    /// Classify a frame.
    ///
    /// A frame addressed to the monitored address is inbound and belongs
    /// to its source; every other frame is outbound and belongs to its
    /// destination.
    pub fn classify(&self, frame: &ParsedFrame) -> Result<Classification, ParseError> {
        let ipv4 = frame.ipv4.ok_or(ParseError::Absent(Layer::Ipv4))?;

        let (peer, direction) = if ipv4.destination == self.local {
            (ipv4.source, Direction::Inbound)
        } else {
            (ipv4.destination, Direction::Outbound)
        };

        Ok(Classification {
            peer,
            direction,
            size: frame.length as u64,
        })
    }
}
