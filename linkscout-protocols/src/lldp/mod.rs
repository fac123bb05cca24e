//! Link Layer Discovery Protocol (IEEE 802.1AB)
//!
//! LLDP frames are Ethernet II with EtherType 0x88CC, sent to one of the
//! three reserved bridge-group addresses. The LLDPDU is a chain of TLVs
//! whose header packs a 7-bit type and a 9-bit length into one word, closed
//! by an End TLV (type 0).
//!
//! ```rust
//! use linkscout_core::MacAddr;
//! use linkscout_protocols::lldp::{self, LldpPdu, LldpTlv};
//!
//! let mac = MacAddr::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
//! let frame = LldpPdu::new_basic(mac, "ge-0/0/1", 120)
//!     .add_tlv(LldpTlv::system_name("access-01"))
//!     .to_frame(mac);
//!
//! let record = lldp::decode(&frame).unwrap();
//! assert_eq!(record.chassis_id.as_deref(), Some("00:11:22:33:44:55"));
//! assert_eq!(record.system_name.as_deref(), Some("access-01"));
//! ```

mod decoder;
mod packet;

pub use decoder::{decode, parse_chassis_id, parse_mgmt_address, parse_port_id, LldpRecord};
pub use packet::*;
