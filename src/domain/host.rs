//! Per-peer counters.

/// Direction of a frame relative to the monitored interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Destination is the monitored address
    Inbound,
    /// Anything else
    Outbound,
}

/// Traffic statistics for a single remote peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    /// Dotted-decimal address of the peer
    pub peer_address: String,
    /// Name discovered from HTTP or TLS; empty until resolved
    pub display_name: String,
    pub in_packets: u64,
    pub out_packets: u64,
    pub in_traffic: u64,
    pub out_traffic: u64,
}

impl HostRecord {
    /// Create a zeroed, unnamed record.
    pub fn new(peer_address: impl Into<String>) -> Self {
        Self {
            peer_address: peer_address.into(),
            display_name: String::new(),
            in_packets: 0,
            out_packets: 0,
            in_traffic: 0,
            out_traffic: 0,
        }
    }

    /// Count one packet of `size` bytes in the given direction.
    pub fn add_packet(&mut self, size: u64, direction: Direction) {
        match direction {
            Direction::Inbound => {
                self.in_packets = self.in_packets.saturating_add(1);
                self.in_traffic = self.in_traffic.saturating_add(size);
            }
            Direction::Outbound => {
                self.out_packets = self.out_packets.saturating_add(1);
                self.out_traffic = self.out_traffic.saturating_add(size);
            }
        }
    }

    pub fn is_named(&self) -> bool {
        !self.display_name.is_empty()
    }

    /// Set the display name unless one is already established.
    ///
    /// Returns `true` if the name was written.
    pub fn set_name_once(&mut self, name: &str) -> bool {
        if self.is_named() || name.is_empty() {
            return false;
        }
        self.display_name = name.to_string();
        true
    }

    /// The name if known, otherwise the address.
    pub fn label(&self) -> &str {
        if self.is_named() {
            &self.display_name
        } else {
            &self.peer_address
        }
    }

    pub fn total_packets(&self) -> u64 {
        self.in_packets.saturating_add(self.out_packets)
    }

    pub fn total_traffic(&self) -> u64 {
        self.in_traffic.saturating_add(self.out_traffic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_zeroed() {
        let record = HostRecord::new("10.0.0.5");
        assert_eq!(record.peer_address, "10.0.0.5");
        assert!(!record.is_named());
        assert_eq!(record.total_packets(), 0);
        assert_eq!(record.total_traffic(), 0);
    }

    #[test]
    fn test_add_packet_inbound() {
        let mut record = HostRecord::new("192.192.1.1");
        record.add_packet(54, Direction::Inbound);

        assert_eq!(record.in_packets, 1);
        assert_eq!(record.in_traffic, 54);
        assert_eq!(record.out_packets, 0);
        assert_eq!(record.out_traffic, 0);
    }

    #[test]
    fn test_add_packet_outbound() {
        let mut record = HostRecord::new("10.0.0.5");
        record.add_packet(60, Direction::Outbound);
        record.add_packet(40, Direction::Outbound);

        assert_eq!(record.out_packets, 2);
        assert_eq!(record.out_traffic, 100);
        assert_eq!(record.total_packets(), 2);
    }

    #[test]
    fn test_counters_saturate() {
        let mut record = HostRecord::new("10.0.0.5");
        record.in_traffic = u64::MAX - 1;
        record.add_packet(10, Direction::Inbound);
        assert_eq!(record.in_traffic, u64::MAX);
    }

    #[test]
    fn test_set_name_once() {
        let mut record = HostRecord::new("10.0.0.5");
        assert!(!record.set_name_once(""));
        assert!(record.set_name_once("a.example"));
        assert!(!record.set_name_once("b.example"));
        assert_eq!(record.display_name, "a.example");
    }

    #[test]
    fn test_label_prefers_name() {
        let mut record = HostRecord::new("10.0.0.5");
        assert_eq!(record.label(), "10.0.0.5");
        record.set_name_once("a.example");
        assert_eq!(record.label(), "a.example");
    }
}
