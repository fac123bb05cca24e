//! linkscout core library
//!
//! This crate provides the fundamental types, error handling and the
//! collaborator interfaces shared by the linkscout decoders and capture engine.

pub mod error;
pub mod frame;
pub mod interface;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use frame::{RawFrame, ETHERNET_HEADER_LEN};
pub use interface::{LinkEnumerator, LinkHandle, StaticLinks};
pub use types::*;
