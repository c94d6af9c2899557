//! Address-ordered host table.

use std::collections::btree_map::{BTreeMap, Values};

use crate::domain::HostRecord;

/// Host records keyed by dotted-decimal address.
///
/// Iteration is in ascending string order of the address (so `10.0.0.5`
/// comes before `2.2.2.2`), which keeps rendered output stable.
#[derive(Debug, Default)]
pub struct Registry {
    hosts: BTreeMap<String, HostRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a peer, creating a zeroed record on first sight.
    pub fn entry(&mut self, peer_address: &str) -> &mut HostRecord {
        self.hosts
            .entry(peer_address.to_string())
            .or_insert_with(|| HostRecord::new(peer_address))
    }

    pub fn iter(&self) -> Values<'_, String, HostRecord> {
        self.hosts.values()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn clear(&mut self) {
        self.hosts.clear();
    }
}
