//! Point-in-time copies of the host table and their text/JSON renderings.

use std::fmt::Write as _;

use serde::Serialize;

use crate::domain::HostRecord;

/// In/out/total triple as it appears in the JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counters {
    #[serde(rename = "in")]
    pub inbound: u64,
    #[serde(rename = "out")]
    pub outbound: u64,
    pub total: u64,
}

impl Counters {
    fn new(inbound: u64, outbound: u64) -> Self {
        Self {
            inbound,
            outbound,
            total: inbound.saturating_add(outbound),
        }
    }
}

/// One peer's line in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostSnapshot {
    pub ip: String,
    pub name: String,
    pub traffic: Counters,
    pub packets: Counters,
}

impl From<&HostRecord> for HostSnapshot {
    fn from(record: &HostRecord) -> Self {
        Self {
            ip: record.peer_address.clone(),
            name: record.display_name.clone(),
            traffic: Counters::new(record.in_traffic, record.out_traffic),
            packets: Counters::new(record.in_packets, record.out_packets),
        }
    }
}

impl HostSnapshot {
    /// The name if known, otherwise the address.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.ip
        } else {
            &self.name
        }
    }
}

/// Lock-consistent copy of every host, in address order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub hosts: Vec<HostSnapshot>,
}

impl Snapshot {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a HostRecord>) -> Self {
        Self {
            hosts: records.into_iter().map(HostSnapshot::from).collect(),
        }
    }

    /// Fixed-width table, one line per host. Empty when there are no hosts.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for host in &self.hosts {
            // Writing into a String cannot fail.
            let _ = writeln!(
                out,
                "{:<37} {:>6} packets (OUT {:<6} | {:>6} IN) traffic: {:>8} [bytes] (OUT {:<8} | {:>6} IN)",
                host.label(),
                host.packets.total,
                host.packets.outbound,
                host.packets.inbound,
                host.traffic.total,
                host.traffic.outbound,
                host.traffic.inbound,
            );
        }
        out
    }

    /// Compact JSON: `{"hosts":[...]}`.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize snapshot: {}", e);
            String::from(r#"{"hosts":[]}"#)
        })
    }
}
