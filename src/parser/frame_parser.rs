//! Ethernet frame decoder.
//!
//! Turns raw captured bytes into a [`ParsedFrame`]. Decoding never fails:
//! a layer that cannot be read is left out and the frame is still returned.

use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::tcp::TcpPacket;
use pnet::packet::Packet;

use super::{http, tls};
use crate::domain::ParsedFrame;

/// Minimum IPv4 header length in 32-bit words
const MIN_IPV4_IHL: u8 = 5;
/// Minimum TCP data offset in 32-bit words
const MIN_TCP_DATA_OFFSET: u8 = 5;

/// Parser for captured Ethernet frames.
pub struct FrameParser;

impl FrameParser {
    /// Create a new frame parser.
    pub fn new() -> Self {
        Self
    }

    /// Decode a raw Ethernet frame.
    pub fn parse(&self, data: &[u8]) -> ParsedFrame {
        let mut frame = ParsedFrame::new(data.len());

        let ethernet = match EthernetPacket::new(data) {
            Some(ethernet) => ethernet,
            None => return frame,
        };
        if ethernet.get_ethertype() != EtherTypes::Ipv4 {
            return frame;
        }

        let ipv4 = match Ipv4Packet::new(ethernet.payload()) {
            Some(ipv4) if ipv4.get_header_length() >= MIN_IPV4_IHL => ipv4,
            _ => return frame,
        };
        frame = frame.with_ipv4(ipv4.get_source(), ipv4.get_destination());

        if ipv4.get_next_level_protocol() != IpNextHeaderProtocols::Tcp {
            return frame;
        }

        let tcp = match TcpPacket::new(ipv4.payload()) {
            Some(tcp) if tcp.get_data_offset() >= MIN_TCP_DATA_OFFSET => tcp,
            _ => return frame,
        };
        let payload = tcp.payload();
        if payload.is_empty() {
            return frame;
        }

        if let Some(request) = http::parse_request(payload) {
            frame.http_request = Some(request);
        } else if tls::looks_like_tls(payload) {
            frame.tls_handshakes = tls::parse_handshakes(payload);
        }

        frame
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}
