//! Discovery capture for linkscout
//!
//! This crate binds the decoders to live links:
//!
//! - **Capture primitive**: the [`FrameSource`] seam and its libpcap
//!   implementation [`PcapSource`]
//! - **Filters**: BPF expressions for CDP and LLDP traffic
//! - **Links**: [`SystemLinks`] enumerates interfaces and their speed
//! - **LinkCapture**: one capture thread per interface with a local
//!   neighbor table and cooperative, time-bounded stop
//! - **CaptureCoordinator**: many links, one deduplicated neighbor table,
//!   consumer callback and event channel
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use linkscout_capture::{CaptureCoordinator, PcapSource, SystemLinks};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let coordinator = CaptureCoordinator::new(
//!     Arc::new(PcapSource::default()),
//!     Arc::new(SystemLinks::new()),
//! );
//! coordinator.on_neighbor(|n| println!("{} via {}", n.device_id, n.local_interface));
//! coordinator.add_interface("eth0")?;
//! coordinator.start_all()?;
//!
//! // Later
//! coordinator.stop_all();
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod filters;
pub mod interface;
pub mod link_capture;
pub mod source;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{CaptureCoordinator, DiscoveryEvent};
pub use interface::SystemLinks;
pub use link_capture::{
    CaptureState, ErrorCallback, LinkCapture, LinkCaptureConfig, NeighborCallback, StopOutcome,
};
pub use source::{CaptureConfig, FrameSource, PcapSource};
pub use stats::{CaptureStats, StatsAccumulator};
