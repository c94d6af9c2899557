//! Per-peer traffic monitor.
//!
//! Captures frames on one interface, attributes each to the remote peer
//! by direction, keeps packet and byte counters per peer and names peers
//! from HTTP `Host` headers and TLS SNI.
//!
//! # Architecture
//!
//! - `domain`: frame layer view and per-host records
//! - `parser`: raw Ethernet bytes to [`domain::ParsedFrame`]
//! - `analysis`: direction classification and name discovery
//! - `stats`: the mutex-guarded aggregator behind the [`stats::TrafficStats`] trait
//! - `capture`: the [`capture::PacketCapture`] trait and its pnet implementation
//! - `reporter`, `http`: console output and the JSON endpoint
//! - `monitor`: wires the above together for one session

pub mod analysis;
pub mod capture;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod monitor;
pub mod parser;
pub mod reporter;
pub mod stats;

pub use config::{Cli, Config};
pub use monitor::Monitor;
pub use stats::{Snapshot, StatsAggregator, TrafficStats, WindowPolicy};
