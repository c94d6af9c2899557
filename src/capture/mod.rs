//! Packet capture abstraction.
//!
//! This module defines the `PacketCapture` trait and provides a
//! pnet-based implementation. The monitor depends only on the trait, so
//! tests can feed it prepared frames.

mod pnet_capture;

pub use pnet_capture::PnetCapture;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::tcp::TcpPacket;
use pnet::packet::udp::UdpPacket;
use pnet::packet::Packet;

use crate::error::CaptureError;

/// A raw frame captured from the wire.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// The whole frame, starting at the Ethernet header
    pub data: Vec<u8>,
}

/// Trait for packet capture implementations.
///
/// Frames are delivered one at a time, in capture order.
pub trait PacketCapture: Send {
    /// Start capturing and return an iterator over frames.
    ///
    /// The iterator returns `None` once the running flag is cleared.
    fn frames(&mut self) -> Result<Box<dyn Iterator<Item = RawFrame> + '_>, CaptureError>;

    /// Get the name of the interface being captured.
    fn interface_name(&self) -> &str;

    /// Set the running flag for graceful shutdown.
    fn set_running(&mut self, running: Arc<AtomicBool>);
}

/// Restricts capture to TCP/UDP frames using one of a set of ports.
///
/// An empty filter lets every frame through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortFilter {
    ports: Vec<u16>,
}

impl PortFilter {
    pub fn new(ports: Vec<u16>) -> Self {
        Self { ports }
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Check whether a raw Ethernet frame passes the filter.
    pub fn matches(&self, data: &[u8]) -> bool {
        if self.ports.is_empty() {
            return true;
        }
        match transport_ports(data) {
            Some((src, dst)) => self.ports.contains(&src) || self.ports.contains(&dst),
            None => false,
        }
    }
}

/// Source and destination ports of a TCP or UDP frame.
fn transport_ports(data: &[u8]) -> Option<(u16, u16)> {
    let ethernet = EthernetPacket::new(data)?;
    if ethernet.get_ethertype() != EtherTypes::Ipv4 {
        return None;
    }

    let ipv4 = Ipv4Packet::new(ethernet.payload())?;
    match ipv4.get_next_level_protocol() {
        IpNextHeaderProtocols::Tcp => {
            let tcp = TcpPacket::new(ipv4.payload())?;
            Some((tcp.get_source(), tcp.get_destination()))
        }
        IpNextHeaderProtocols::Udp => {
            let udp = UdpPacket::new(ipv4.payload())?;
            Some((udp.get_source(), udp.get_destination()))
        }
        _ => None,
    }
}
