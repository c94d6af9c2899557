//! pnet-based packet capture implementation.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pnet::datalink::{self, Channel, Config, NetworkInterface};
use tracing::debug;

use super::{PacketCapture, PortFilter, RawFrame};
use crate::error::CaptureError;

/// How often a blocked read wakes up to check the running flag
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Packet capture using the pnet library.
pub struct PnetCapture {
    interface: NetworkInterface,
    filter: PortFilter,
    running: Arc<AtomicBool>,
}

impl PnetCapture {
    /// Create a capture on the interface owning the given IPv4 address.
    pub fn by_ipv4(addr: Ipv4Addr) -> Result<Self, CaptureError> {
        let interface = datalink::interfaces()
            .into_iter()
            .find(|iface| iface.ips.iter().any(|ip| ip.ip() == IpAddr::V4(addr)))
            .ok_or_else(|| {
                CaptureError::InterfaceNotFound(format!("no interface with IPv4 address {}", addr))
            })?;

        Ok(Self::with_interface(interface))
    }

    fn with_interface(interface: NetworkInterface) -> Self {
        Self {
            interface,
            filter: PortFilter::default(),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Only deliver TCP/UDP frames using one of these ports.
    pub fn with_port_filter(mut self, filter: PortFilter) -> Self {
        self.filter = filter;
        self
    }

    /// IPv4 address of the first suitable interface.
    ///
    /// Looks for an interface that is up and not a loopback.
    pub fn default_ipv4() -> Option<Ipv4Addr> {
        datalink::interfaces()
            .into_iter()
            .filter(|iface| iface.is_up() && !iface.is_loopback())
            .flat_map(|iface| iface.ips)
            .find_map(|ip| match ip.ip() {
                IpAddr::V4(v4) => Some(v4),
                IpAddr::V6(_) => None,
            })
    }

    /// List all available network interfaces.
    pub fn list_interfaces() -> Vec<String> {
        datalink::interfaces()
            .into_iter()
            .map(|iface| {
                let status = if iface.is_up() { "UP" } else { "DOWN" };
                let ips: Vec<_> = iface.ips.iter().map(|ip| ip.ip().to_string()).collect();
                format!(
                    "{:<20} {:<4} [{}]",
                    iface.name,
                    status,
                    if ips.is_empty() {
                        "no IP".to_string()
                    } else {
                        ips.join(", ")
                    }
                )
            })
            .collect()
    }
}

impl PacketCapture for PnetCapture {
    fn frames(&mut self) -> Result<Box<dyn Iterator<Item = RawFrame> + '_>, CaptureError> {
        let config = Config {
            read_timeout: Some(READ_TIMEOUT),
            ..Config::default()
        };

        let (_tx, rx) = match datalink::channel(&self.interface, config) {
            Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
            Ok(_) => {
                return Err(CaptureError::ChannelCreation(
                    "unsupported channel type".to_string(),
                ))
            }
            Err(e) => {
                let msg = e.to_string();
                if msg.contains("permission") || msg.contains("Operation not permitted") {
                    return Err(CaptureError::InsufficientPermissions);
                }
                return Err(CaptureError::ChannelCreation(msg));
            }
        };

        Ok(Box::new(FrameIterator {
            rx,
            filter: &self.filter,
            running: Arc::clone(&self.running),
        }))
    }

    fn interface_name(&self) -> &str {
        &self.interface.name
    }

    fn set_running(&mut self, running: Arc<AtomicBool>) {
        self.running = running;
    }
}

/// Iterator that yields frames from the network until stopped.
struct FrameIterator<'a> {
    rx: Box<dyn datalink::DataLinkReceiver>,
    filter: &'a PortFilter,
    running: Arc<AtomicBool>,
}

impl Iterator for FrameIterator<'_> {
    type Item = RawFrame;

    fn next(&mut self) -> Option<Self::Item> {
        while self.running.load(Ordering::SeqCst) {
            match self.rx.next() {
                Ok(packet) => {
                    if self.filter.matches(packet) {
                        return Some(RawFrame {
                            data: packet.to_vec(),
                        });
                    }
                }
                Err(e) => {
                    // Timeout is expected, it lets us check the running flag
                    if e.kind() != std::io::ErrorKind::TimedOut {
                        debug!("Capture error: {}", e);
                    }
                }
            }
        }
        None
    }
}
