//! Command line options and validated runtime configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::ConfigError;
use crate::stats::WindowPolicy;

const DEFAULT_UPDATE_SECS: i64 = 5;
const DEFAULT_HTTP_BIND: &str = "127.0.0.1:8080";

#[derive(Parser, Debug)]
#[command(name = "peerstat")]
#[command(about = "Per-peer traffic monitor - counts packets and bytes per remote host")]
pub struct Cli {
    /// IPv4 address of the interface to monitor (default: first active interface)
    #[arg(short, long)]
    pub ip: Option<String>,

    /// Print the list of interfaces and exit
    #[arg(short, long)]
    pub list_interfaces: bool,

    /// Program execution time in seconds (default: run until interrupted)
    #[arg(short = 't', long = "exe-time", allow_negative_numbers = true)]
    pub exe_time: Option<i64>,

    /// Report period in seconds
    #[arg(
        short = 'u',
        long = "update-time",
        default_value_t = DEFAULT_UPDATE_SECS,
        allow_negative_numbers = true
    )]
    pub update_time: i64,

    /// Reset counters after every report instead of accumulating
    #[arg(long)]
    pub reset_each_interval: bool,

    /// Only count TCP/UDP traffic on this port (repeatable)
    #[arg(short = 'p', long = "port")]
    pub ports: Vec<u16>,

    /// Address for the JSON statistics endpoint
    #[arg(long, default_value = DEFAULT_HTTP_BIND)]
    pub http: SocketAddr,

    /// Do not start the JSON statistics endpoint
    #[arg(long)]
    pub no_http: bool,

    /// Write logs to a daily file in this directory instead of stderr
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Validated runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub interface_ip: Ipv4Addr,
    pub update_period: Duration,
    /// `None` runs until interrupted
    pub execution_time: Option<Duration>,
    pub window: WindowPolicy,
    pub ports: Vec<u16>,
    /// `None` disables the HTTP endpoint
    pub http_bind: Option<SocketAddr>,
    pub log_dir: Option<PathBuf>,
    pub verbose: bool,
}

impl Config {
    /// Validate parsed arguments.
    ///
    /// `default_ip` is consulted only when no `--ip` was given.
    pub fn from_cli<F>(cli: &Cli, default_ip: F) -> Result<Self, ConfigError>
    where
        F: FnOnce() -> Option<Ipv4Addr>,
    {
        let interface_ip = match &cli.ip {
            Some(ip) => ip
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidAddress(ip.clone()))?,
            None => default_ip().ok_or(ConfigError::NoDefaultInterface)?,
        };

        let execution_time = match cli.exe_time {
            Some(secs) if secs < 0 => return Err(ConfigError::NegativeExecutionTime(secs)),
            Some(secs) => Some(Duration::from_secs(secs as u64)),
            None => None,
        };

        if cli.update_time <= 0 {
            return Err(ConfigError::InvalidUpdatePeriod(cli.update_time));
        }

        let window = if cli.reset_each_interval {
            WindowPolicy::ResetEachInterval
        } else {
            WindowPolicy::Accumulate
        };

        Ok(Config {
            interface_ip,
            update_period: Duration::from_secs(cli.update_time as u64),
            execution_time,
            window,
            ports: cli.ports.clone(),
            http_bind: if cli.no_http { None } else { Some(cli.http) },
            log_dir: cli.log_dir.clone(),
            verbose: cli.verbose,
        })
    }

    /// Default tracing filter directive when `RUST_LOG` is not set.
    pub fn tracing_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn no_default() -> Option<Ipv4Addr> {
        None
    }

    #[test]
    fn test_negative_execution_time() {
        let cli = parse(&["peerstat", "-i", "127.0.0.1", "-t", "-100"]);
        assert_eq!(
            Config::from_cli(&cli, no_default),
            Err(ConfigError::NegativeExecutionTime(-100))
        );
    }

    #[test]
    fn test_negative_update_time() {
        let cli = parse(&["peerstat", "-i", "127.0.0.1", "-u", "-100"]);
        assert_eq!(
            Config::from_cli(&cli, no_default),
            Err(ConfigError::InvalidUpdatePeriod(-100))
        );
    }

    #[test]
    fn test_zero_update_time() {
        let cli = parse(&["peerstat", "-i", "127.0.0.1", "-u", "0"]);
        assert!(Config::from_cli(&cli, no_default).is_err());
    }

    #[test]
    fn test_no_params() {
        let cli = parse(&["peerstat"]);
        let config = Config::from_cli(&cli, || Some(Ipv4Addr::new(192, 168, 1, 10))).unwrap();

        assert_eq!(config.interface_ip, Ipv4Addr::new(192, 168, 1, 10));
        assert_eq!(config.update_period, Duration::from_secs(5));
        assert_eq!(config.execution_time, None);
        assert_eq!(config.window, WindowPolicy::Accumulate);
        assert_eq!(config.http_bind, Some("127.0.0.1:8080".parse().unwrap()));
        assert!(config.ports.is_empty());
        assert_eq!(config.tracing_filter(), "info");
    }

    #[test]
    fn test_no_params_without_default_interface() {
        let cli = parse(&["peerstat"]);
        assert_eq!(
            Config::from_cli(&cli, no_default),
            Err(ConfigError::NoDefaultInterface)
        );
    }

    #[test]
    fn test_right_params() {
        let cli = parse(&["peerstat", "-u", "10", "-t", "200", "-i", "127.0.0.1"]);
        let config = Config::from_cli(&cli, || panic!("default should not be consulted")).unwrap();

        assert_eq!(config.interface_ip, Ipv4Addr::LOCALHOST);
        assert_eq!(config.update_period, Duration::from_secs(10));
        assert_eq!(config.execution_time, Some(Duration::from_secs(200)));
    }

    #[test]
    fn test_invalid_ip() {
        let cli = parse(&["peerstat", "-i", "not-an-ip"]);
        assert_eq!(
            Config::from_cli(&cli, no_default),
            Err(ConfigError::InvalidAddress("not-an-ip".to_string()))
        );
    }

    #[test]
    fn test_optional_features() {
        let cli = parse(&[
            "peerstat",
            "-i",
            "10.0.0.1",
            "--reset-each-interval",
            "-p",
            "80",
            "--port",
            "443",
            "--no-http",
            "-v",
        ]);
        let config = Config::from_cli(&cli, no_default).unwrap();

        assert_eq!(config.window, WindowPolicy::ResetEachInterval);
        assert_eq!(config.ports, vec![80, 443]);
        assert_eq!(config.http_bind, None);
        assert_eq!(config.tracing_filter(), "debug");
    }

    #[test]
    fn test_list_interfaces_flag() {
        let cli = parse(&["peerstat", "-l"]);
        assert!(cli.list_interfaces);
    }
}
