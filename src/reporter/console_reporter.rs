//! Console-based statistics reporter.

use std::io::{self, Write};
use std::net::{Ipv4Addr, SocketAddr};

use crate::reporter::StatsReporter;
use crate::stats::Snapshot;

const RULE_WIDTH: usize = 128;

/// Prints snapshots to stdout as fixed-width tables.
pub struct ConsoleReporter {
    /// Where the JSON endpoint listens, announced at start
    http_bind: Option<SocketAddr>,
}

impl ConsoleReporter {
    /// Create a new console reporter.
    pub fn new() -> Self {
        Self { http_bind: None }
    }

    /// Announce the JSON endpoint on start.
    pub fn with_http_bind(mut self, http_bind: Option<SocketAddr>) -> Self {
        self.http_bind = http_bind;
        self
    }

    fn format_start(&self, interface: &str, address: Ipv4Addr) -> String {
        let mut output = format!(
            "Monitoring traffic on interface {} ({})\nPress Ctrl+C to stop.\n",
            interface, address
        );
        if let Some(addr) = self.http_bind {
            output.push_str(&format!(
                "Use this to get statistics in JSON format: curl \"http://{}/stat\"\n",
                addr
            ));
        }
        output
    }

    fn format_report(&self, snapshot: &Snapshot) -> String {
        format!("{}{}\n", snapshot.to_text(), "-".repeat(RULE_WIDTH))
    }

    fn format_finish(&self, snapshot: &Snapshot) -> String {
        format!(
            "{}\n{}{}\n{}\n",
            banner("RESULTS"),
            snapshot.to_text(),
            banner("JSON-RESULTS"),
            snapshot.to_json()
        )
    }

    fn emit(&self, output: &str) {
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(output.as_bytes());
        let _ = stdout.flush();
    }
}

/// A dashed rule of `RULE_WIDTH` columns with `title` in the middle.
fn banner(title: &str) -> String {
    let dashes = RULE_WIDTH.saturating_sub(title.len());
    let left = dashes / 2;
    format!("{}{}{}", "-".repeat(left), title, "-".repeat(dashes - left))
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsReporter for ConsoleReporter {
    fn on_start(&self, interface: &str, address: Ipv4Addr) {
        self.emit(&self.format_start(interface, address));
    }

    fn report(&self, snapshot: &Snapshot) {
        self.emit(&self.format_report(snapshot));
    }

    fn on_finish(&self, snapshot: &Snapshot) {
        self.emit(&self.format_finish(snapshot));
    }
}
