//! Cisco Discovery Protocol (CDP)
//!
//! ## Frame Structure
//!
//! CDP uses LLC/SNAP encapsulation over 802.3:
//! - Destination MAC: 01:00:0C:CC:CC:CC (CDP multicast)
//! - LLC: DSAP=0xAA, SSAP=0xAA, Control=0x03
//! - SNAP: OUI=0x00000C (Cisco), Type=0x2000 (CDP)
//! - CDP header: version (1), TTL (1), checksum (2), then the TLV chain
//!
//! Captures from some platforms shift the header, so [`find_header`] falls
//! back to a signature scan when the standard layout is not present.
//!
//! ## Example
//!
//! ```rust
//! use linkscout_core::MacAddr;
//! use linkscout_protocols::cdp::{self, CdpPdu, CdpTlv};
//!
//! let frame = CdpPdu::new()
//!     .add_tlv(CdpTlv::DeviceId("core-sw1".to_string()))
//!     .add_tlv(CdpTlv::PortId("GigabitEthernet1/0/24".to_string()))
//!     .to_frame(MacAddr::new([0x00, 0x1b, 0x54, 0x12, 0x34, 0x56]));
//!
//! let record = cdp::decode(&frame).unwrap();
//! assert_eq!(record.device_id.as_deref(), Some("core-sw1"));
//! ```

mod decoder;
mod packet;

pub use decoder::{decode, find_header, parse_addresses, CdpRecord};
pub use packet::*;
