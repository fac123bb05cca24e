//! Command-line front end for linkscout
//!
//! Argument parsing and console rendering; the binary in `main.rs` wires
//! them to a [`linkscout_capture::CaptureCoordinator`].

pub mod args;
pub mod output;

pub use args::{Cli, Commands};
