//! HTTP endpoint for the JSON statistics.

mod server;

pub use server::StatsServer;
