//! Common types used throughout linkscout

use std::fmt;

/// MAC Address (6 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// Create a new MAC address
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Create a MAC address from the first six bytes of a slice
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; 6] = slice.get(..6)?.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Get bytes as slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

/// Discovery protocol a frame or neighbor belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiscoveryProtocol {
    /// Cisco Discovery Protocol
    Cdp,
    /// IEEE 802.1AB Link Layer Discovery Protocol
    Lldp,
}

impl DiscoveryProtocol {
    /// Short upper-case tag ("CDP" / "LLDP")
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoveryProtocol::Cdp => "CDP",
            DiscoveryProtocol::Lldp => "LLDP",
        }
    }
}

impl fmt::Display for DiscoveryProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ethertype constants
pub mod ethertypes {
    pub const LLDP: u16 = 0x88CC;
}

/// Well-known discovery multicast addresses
pub mod multicast {
    use super::MacAddr;

    /// CDP/VTP/DTP multicast address (01:00:0C:CC:CC:CC)
    pub const CDP: MacAddr = MacAddr([0x01, 0x00, 0x0C, 0xCC, 0xCC, 0xCC]);

    /// LLDP nearest bridge (01:80:C2:00:00:0E)
    pub const LLDP_NEAREST_BRIDGE: MacAddr = MacAddr([0x01, 0x80, 0xC2, 0x00, 0x00, 0x0E]);

    /// LLDP nearest non-TPMR bridge (01:80:C2:00:00:03)
    pub const LLDP_NON_TPMR_BRIDGE: MacAddr = MacAddr([0x01, 0x80, 0xC2, 0x00, 0x00, 0x03]);

    /// LLDP nearest customer bridge (01:80:C2:00:00:00)
    pub const LLDP_CUSTOMER_BRIDGE: MacAddr = MacAddr([0x01, 0x80, 0xC2, 0x00, 0x00, 0x00]);

    /// All LLDP destination addresses
    pub const LLDP_ALL: [MacAddr; 3] = [
        LLDP_NEAREST_BRIDGE,
        LLDP_NON_TPMR_BRIDGE,
        LLDP_CUSTOMER_BRIDGE,
    ];
}
