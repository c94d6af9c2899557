//! Wiring of capture, aggregation and reporting.
//!
//! The monitor owns the aggregator and shares it by `Arc` with the
//! capture thread and the HTTP endpoint. The calling thread drives the
//! reporting windows.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info, warn};

use crate::capture::PacketCapture;
use crate::config::Config;
use crate::error::CaptureError;
use crate::http::StatsServer;
use crate::parser::FrameParser;
use crate::reporter::StatsReporter;
use crate::stats::{Snapshot, StatsAggregator, TrafficStats};

/// Longest time the report loop sleeps before re-checking the running flag
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Runs one monitoring session.
pub struct Monitor {
    config: Config,
    stats: Arc<StatsAggregator>,
    reporter: Box<dyn StatsReporter>,
    running: Arc<AtomicBool>,
}

impl Monitor {
    pub fn new(config: Config, reporter: Box<dyn StatsReporter>) -> Self {
        let stats = StatsAggregator::new(config.interface_ip).with_window_policy(config.window);
        Self {
            config,
            stats: Arc::new(stats),
            reporter,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Clearing this flag stops the session at the next poll.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn stats(&self) -> Arc<StatsAggregator> {
        Arc::clone(&self.stats)
    }

    /// Capture and report until the execution time elapses or the running
    /// flag is cleared. Returns the final snapshot.
    pub fn run(&self, mut capture: Box<dyn PacketCapture>) -> Result<Snapshot> {
        capture.set_running(self.running_flag());
        let interface = capture.interface_name().to_string();

        let http_handle = match self.config.http_bind {
            Some(addr) => {
                let stats: Arc<dyn TrafficStats> = self.stats();
                let server = StatsServer::new(stats, addr).with_running(self.running_flag());
                let listener = server.bind()?;
                let handle = thread::Builder::new()
                    .name("http".to_string())
                    .spawn(move || server.serve(listener))
                    .context("Failed to spawn HTTP thread")?;
                Some(handle)
            }
            None => None,
        };

        let stats = self.stats();
        let running = self.running_flag();
        let capture_handle = thread::Builder::new()
            .name("capture".to_string())
            .spawn(move || capture_frames(capture, stats, running))
            .context("Failed to spawn capture thread")?;

        let address = self.stats.local_address();
        info!(
            "Monitoring {} ({}), window policy {:?}",
            interface,
            address,
            self.stats.window_policy()
        );
        self.reporter.on_start(&interface, address);

        self.report_loop();
        self.running.store(false, Ordering::SeqCst);

        let captured = capture_handle
            .join()
            .map_err(|_| anyhow!("capture thread panicked"))?;

        if let Some(handle) = http_handle {
            if handle.join().is_err() {
                warn!("HTTP thread panicked");
            }
        }

        let frames = captured.context("Packet capture failed")?;
        info!("Capture stopped after {} frames", frames);

        let last = self.stats.close_window();
        self.reporter.on_finish(&last);
        Ok(last)
    }

    fn report_loop(&self) {
        let started = Instant::now();
        let deadline = self.config.execution_time.map(|limit| started + limit);
        let mut next_report = started + self.config.update_period;

        loop {
            let wake = match deadline {
                Some(deadline) => next_report.min(deadline),
                None => next_report,
            };
            if !self.sleep_until(wake) {
                debug!("Monitoring interrupted");
                return;
            }

            let now = Instant::now();
            if now >= next_report {
                self.reporter.report(&self.stats.close_window());
                next_report += self.config.update_period;
            }
            if deadline.is_some_and(|deadline| now >= deadline) {
                debug!("Execution time elapsed");
                return;
            }
        }
    }

    /// Sleep until `wake`, returning `false` early if the running flag clears.
    fn sleep_until(&self, wake: Instant) -> bool {
        loop {
            if !self.running.load(Ordering::SeqCst) {
                return false;
            }
            let now = Instant::now();
            if now >= wake {
                return true;
            }
            thread::sleep((wake - now).min(POLL_INTERVAL));
        }
    }
}

/// Body of the capture thread: parse every frame and hand it to the stats.
fn capture_frames(
    mut capture: Box<dyn PacketCapture>,
    stats: Arc<StatsAggregator>,
    running: Arc<AtomicBool>,
) -> Result<u64, CaptureError> {
    let parser = FrameParser::new();
    let frames = match capture.frames() {
        Ok(frames) => frames,
        Err(e) => {
            running.store(false, Ordering::SeqCst);
            return Err(e);
        }
    };

    let mut count = 0u64;
    for raw in frames {
        stats.add_frame(&parser.parse(&raw.data));
        count += 1;
    }
    Ok(count)
}
