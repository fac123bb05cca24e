//! Frame classification by destination MAC and EtherType

use linkscout_core::{ethertypes, multicast, DiscoveryProtocol, MacAddr, ETHERNET_HEADER_LEN};

/// Result of classifying a raw Ethernet frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Cdp,
    Lldp,
    Unknown,
}

impl FrameKind {
    /// The discovery protocol, if the frame is a discovery frame
    pub fn protocol(self) -> Option<DiscoveryProtocol> {
        match self {
            FrameKind::Cdp => Some(DiscoveryProtocol::Cdp),
            FrameKind::Lldp => Some(DiscoveryProtocol::Lldp),
            FrameKind::Unknown => None,
        }
    }
}

/// Tag a frame as CDP, LLDP, or Unknown
///
/// Frames shorter than an Ethernet header are Unknown.
pub fn classify(data: &[u8]) -> FrameKind {
    if data.len() < ETHERNET_HEADER_LEN {
        return FrameKind::Unknown;
    }

    let destination = match MacAddr::from_slice(data) {
        Some(mac) => mac,
        None => return FrameKind::Unknown,
    };

    if destination == multicast::CDP {
        return FrameKind::Cdp;
    }

    if multicast::LLDP_ALL.contains(&destination) {
        return FrameKind::Lldp;
    }

    let ethertype = u16::from_be_bytes([data[12], data[13]]);
    if ethertype == ethertypes::LLDP {
        return FrameKind::Lldp;
    }

    FrameKind::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(dst: [u8; 6], ethertype: u16) -> Vec<u8> {
        let mut data = dst.to_vec();
        data.extend_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        data.extend_from_slice(&ethertype.to_be_bytes());
        data.extend_from_slice(&[0u8; 32]);
        data
    }

    #[test]
    fn test_cdp_destination() {
        let data = frame([0x01, 0x00, 0x0c, 0xcc, 0xcc, 0xcc], 0x0040);
        assert_eq!(classify(&data), FrameKind::Cdp);
        assert_eq!(classify(&data).protocol(), Some(DiscoveryProtocol::Cdp));
    }

    #[test]
    fn test_lldp_destinations() {
        for dst in multicast::LLDP_ALL {
            let data = frame(dst.0, 0x0800);
            assert_eq!(classify(&data), FrameKind::Lldp, "dst {}", dst);
        }
    }

    #[test]
    fn test_lldp_ethertype_unicast() {
        let data = frame([0x00, 0xaa, 0xbb, 0xcc, 0xdd, 0xee], 0x88cc);
        assert_eq!(classify(&data), FrameKind::Lldp);
    }

    #[test]
    fn test_unknown() {
        let data = frame([0xff; 6], 0x0800);
        assert_eq!(classify(&data), FrameKind::Unknown);
        assert_eq!(classify(&data).protocol(), None);
    }

    #[test]
    fn test_short_frame_is_unknown() {
        assert_eq!(classify(&[0x01, 0x00, 0x0c, 0xcc, 0xcc, 0xcc]), FrameKind::Unknown);
        assert_eq!(classify(&[]), FrameKind::Unknown);
    }
}
