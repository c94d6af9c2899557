//! peerstat - per-peer traffic monitor
//!
//! Counts packets and bytes per remote host on one interface and prints
//! a table every update period.

use std::process::ExitCode;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;

use peerstat::capture::{PacketCapture, PnetCapture, PortFilter};
use peerstat::reporter::ConsoleReporter;
use peerstat::{Cli, Config, Monitor};

const LOG_FILE_PREFIX: &str = "peerstat.log";

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list_interfaces {
        println!("Network interfaces:");
        for iface in PnetCapture::list_interfaces() {
            println!("  -> {}", iface);
        }
        return ExitCode::SUCCESS;
    }

    let config = match Config::from_cli(&cli, PnetCapture::default_ipv4) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let _guard = init_tracing(&config);

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging to stderr, or to a daily file when `--log-dir` is set.
///
/// The returned guard must live until exit so buffered lines are flushed.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.tracing_filter()));

    match &config.log_dir {
        Some(dir) => {
            let file_appender = rolling::daily(dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_thread_ids(true)
                .with_ansi(false)
                .with_writer(non_blocking)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}

fn run(config: Config) -> Result<()> {
    tracing::info!("Starting peerstat");
    tracing::debug!("Config: {:?}", config);

    let capture = PnetCapture::by_ipv4(config.interface_ip)
        .with_context(|| format!("Cannot monitor {}", config.interface_ip))?
        .with_port_filter(PortFilter::new(config.ports.clone()));
    tracing::info!("Capturing on interface {}", capture.interface_name());

    let reporter = ConsoleReporter::new().with_http_bind(config.http_bind);
    let monitor = Monitor::new(config, Box::new(reporter));

    let running = monitor.running_flag();
    ctrlc::set_handler(move || {
        tracing::info!("Interrupted, shutting down");
        running.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    monitor.run(Box::new(capture))?;

    tracing::info!("peerstat stopped");
    Ok(())
}
