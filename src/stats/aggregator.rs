//! Mutex-guarded per-peer aggregation.

use std::net::Ipv4Addr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::{Registry, Snapshot, TrafficStats, WindowPolicy};
use crate::analysis::{HostnameResolver, PacketClassifier};
use crate::domain::ParsedFrame;

/// Aggregates frames seen on one interface into per-peer statistics.
///
/// Every operation takes the same lock for its whole body, so a render
/// never sees a record halfway through an update. The capture thread and
/// any number of reporting threads can share one aggregator through an
/// `Arc`.
pub struct StatsAggregator {
    classifier: PacketClassifier,
    resolver: HostnameResolver,
    window: WindowPolicy,
    registry: Mutex<Registry>,
}

impl StatsAggregator {
    /// Create an empty aggregator for the interface owning `local`.
    pub fn new(local: Ipv4Addr) -> Self {
        Self {
            classifier: PacketClassifier::new(local),
            resolver: HostnameResolver::new(),
            window: WindowPolicy::default(),
            registry: Mutex::new(Registry::new()),
        }
    }

    /// Choose whether counters reset after each reporting window.
    pub fn with_window_policy(mut self, window: WindowPolicy) -> Self {
        self.window = window;
        self
    }

    pub fn local_address(&self) -> Ipv4Addr {
        self.classifier.local_address()
    }

    pub fn window_policy(&self) -> WindowPolicy {
        self.window
    }

    /// Number of peers currently tracked.
    pub fn host_count(&self) -> usize {
        self.registry().len()
    }

    // Every mutation leaves the registry consistent, so a panic in another
    // holder does not invalidate the data.
    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TrafficStats for StatsAggregator {
    fn add_frame(&self, frame: &ParsedFrame) {
        let classification = match self.classifier.classify(frame) {
            Ok(c) => c,
            Err(e) => {
                debug!("Skipping frame of {} bytes: {}", frame.length, e);
                return;
            }
        };

        debug!(
            "Captured packet {{ peer: {:<15} direction: {:?} size: {:<9} }}",
            classification.peer, classification.direction, classification.size
        );

        let peer = classification.peer.to_string();
        let mut registry = self.registry();
        let record = registry.entry(&peer);
        record.add_packet(classification.size, classification.direction);
        self.resolver.resolve(record, frame);
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::from_records(self.registry().iter())
    }

    fn close_window(&self) -> Snapshot {
        let mut registry = self.registry();
        let snapshot = Snapshot::from_records(registry.iter());
        if self.window == WindowPolicy::ResetEachInterval && !registry.is_empty() {
            debug!("Resetting counters of {} hosts", registry.len());
            registry.clear();
        }
        snapshot
    }

    fn clear(&self) {
        self.registry().clear();
    }
}
