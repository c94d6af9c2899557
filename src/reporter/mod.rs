//! Reporting module for traffic snapshots.
//!
//! This module defines the `StatsReporter` trait and provides a console
//! implementation. Reporters only format and emit; they never touch the
//! aggregator themselves.

mod console_reporter;

pub use console_reporter::ConsoleReporter;

use std::net::Ipv4Addr;

use crate::stats::Snapshot;

/// Trait for emitting periodic statistics.
pub trait StatsReporter: Send {
    /// Called when monitoring starts.
    fn on_start(&self, interface: &str, address: Ipv4Addr);

    /// Report the snapshot of one closed window.
    fn report(&self, snapshot: &Snapshot);

    /// Called once after capture has stopped, with the last snapshot.
    fn on_finish(&self, snapshot: &Snapshot);
}
