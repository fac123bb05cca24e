//! Discovery protocol decoders for linkscout
//!
//! This crate turns raw Ethernet frames into neighbor records:
//! - [`classify`] tags a frame as CDP, LLDP or Unknown
//! - [`cdp`] and [`lldp`] decode the protocol TLV chains into records,
//!   and build bit-exact PDUs from field values
//! - [`neighbor`] normalizes either record into a [`NeighborRecord`]
//!   keyed by [`NeighborKey`]
//! - [`view`] selects neighbors for display by [`ProtocolMode`]
//!
//! Everything here is a pure function over borrowed input; nothing
//! allocates shared state or locks.
//!
//! ## Example
//!
//! ```rust
//! use linkscout_core::{MacAddr, RawFrame};
//! use linkscout_protocols::cdp::{CdpPdu, CdpTlv};
//! use linkscout_protocols::decode_frame;
//!
//! let data = CdpPdu::new()
//!     .add_tlv(CdpTlv::DeviceId("dist-sw2".to_string()))
//!     .add_tlv(CdpTlv::PortId("TenGigabitEthernet1/1".to_string()))
//!     .to_frame(MacAddr::new([0x00, 0x1b, 0x54, 0x00, 0x00, 0x02]));
//!
//! let neighbor = decode_frame(&RawFrame::new(data), "eth0").unwrap();
//! assert_eq!(neighbor.key().to_string(), "CDP:eth0:dist-sw2:TenGigabitEthernet1/1");
//! ```

pub mod cdp;
pub mod classify;
pub mod decode;
pub mod lldp;
pub mod neighbor;
pub mod tlv;
pub mod view;

pub use classify::{classify, FrameKind};
pub use decode::decode_frame;
pub use neighbor::{NeighborKey, NeighborRecord, ProtocolDetails};
pub use tlv::Tlv;
pub use view::{select_neighbors, ProtocolMode};
