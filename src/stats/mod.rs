//! Traffic statistics module.
//!
//! This module defines the `TrafficStats` trait and the mutex-guarded
//! aggregator implementing it. Reporters and the HTTP endpoint depend on
//! the trait only.

mod aggregator;
mod registry;
mod snapshot;

pub use aggregator::StatsAggregator;
pub use registry::Registry;
pub use snapshot::{Counters, HostSnapshot, Snapshot};

use crate::domain::ParsedFrame;

/// What happens to the counters when a reporting window closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowPolicy {
    /// Counters grow for the lifetime of the process
    #[default]
    Accumulate,
    /// The host table is emptied after every report
    ResetEachInterval,
}

/// Per-peer traffic statistics shared between capture and reporting.
///
/// Implementations must be safe to call from several threads at once;
/// all methods take `&self`.
pub trait TrafficStats: Send + Sync {
    /// Account one captured frame. Frames without an IPv4 layer are ignored.
    fn add_frame(&self, frame: &ParsedFrame);

    /// Copy of all hosts, in address order.
    fn snapshot(&self) -> Snapshot;

    /// Snapshot of the window that just ended; resets the counters if the
    /// window policy says so, atomically with taking the snapshot.
    fn close_window(&self) -> Snapshot;

    /// Forget every host.
    fn clear(&self);

    /// Fixed-width text table of all hosts.
    fn render_text(&self) -> String {
        self.snapshot().to_text()
    }

    /// JSON document `{"hosts":[...]}`.
    fn render_json(&self) -> String {
        self.snapshot().to_json()
    }
}
