//! CLI argument parsing

use std::time::Duration;

use clap::{Parser, Subcommand};
use linkscout_capture::{filters, CaptureConfig, LinkCaptureConfig};
use linkscout_protocols::ProtocolMode;

#[derive(Parser, Debug)]
#[command(name = "linkscout")]
#[command(version, about = "Passive CDP/LLDP neighbor discovery", long_about = None)]
pub struct Cli {
    /// Interface to capture on (repeatable; default: every up, non-loopback link)
    #[arg(short = 'i', long, value_name = "IFACE")]
    pub interface: Vec<String>,

    /// Which discovery protocols to show: auto, cdp, lldp or both
    #[arg(short = 'm', long, default_value = "auto")]
    pub mode: ProtocolMode,

    /// Stop after this many seconds (0 = run until Ctrl-C)
    #[arg(short = 'd', long, value_name = "SECONDS", default_value = "0")]
    pub duration: u64,

    /// How long to wait for each capture loop to exit on shutdown
    #[arg(long, value_name = "MS", default_value = "2000")]
    pub stop_timeout: u64,

    /// Maximum bytes captured per frame
    #[arg(long, default_value = "65535")]
    pub snaplen: i32,

    /// Do not put interfaces into promiscuous mode
    #[arg(long)]
    pub no_promisc: bool,

    /// Verbose output (-v, -vv, -vvv for increasing verbosity)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List capture-capable interfaces and their speed
    Interfaces,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Default log directive for the `-v` count; `RUST_LOG` overrides it
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            snaplen: self.snaplen,
            promiscuous: !self.no_promisc,
            ..Default::default()
        }
    }

    pub fn link_config(&self) -> LinkCaptureConfig {
        LinkCaptureConfig {
            stop_timeout: Duration::from_millis(self.stop_timeout),
            filter: filters::filter_for_mode(self.mode),
        }
    }

    /// Run time limit, if any
    pub fn run_for(&self) -> Option<Duration> {
        (self.duration > 0).then(|| Duration::from_secs(self.duration))
    }
}
