//! Protocol display modes

use std::fmt;
use std::str::FromStr;

use linkscout_core::{DiscoveryProtocol, Error};

use crate::neighbor::NeighborRecord;

/// Which neighbors a consumer wants to see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolMode {
    /// CDP neighbors, plus LLDP neighbors not already seen over CDP
    #[default]
    Auto,
    Cdp,
    Lldp,
    Both,
}

impl ProtocolMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolMode::Auto => "auto",
            ProtocolMode::Cdp => "cdp",
            ProtocolMode::Lldp => "lldp",
            ProtocolMode::Both => "both",
        }
    }

    /// Whether frames of `protocol` need to be captured at all
    pub fn captures(&self, protocol: DiscoveryProtocol) -> bool {
        match self {
            ProtocolMode::Cdp => protocol == DiscoveryProtocol::Cdp,
            ProtocolMode::Lldp => protocol == DiscoveryProtocol::Lldp,
            ProtocolMode::Auto | ProtocolMode::Both => true,
        }
    }
}

impl fmt::Display for ProtocolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtocolMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ProtocolMode::Auto),
            "cdp" => Ok(ProtocolMode::Cdp),
            "lldp" => Ok(ProtocolMode::Lldp),
            "both" | "all" => Ok(ProtocolMode::Both),
            other => Err(Error::InvalidValue(format!(
                "unknown protocol mode '{}' (expected auto, cdp, lldp or both)",
                other
            ))),
        }
    }
}

/// Filter neighbors for display under `mode`
///
/// In [`ProtocolMode::Auto`] an LLDP neighbor is hidden when a CDP neighbor
/// with the same device id was seen on the same local interface.
pub fn select_neighbors(mode: ProtocolMode, neighbors: &[NeighborRecord]) -> Vec<&NeighborRecord> {
    neighbors
        .iter()
        .filter(|n| match mode {
            ProtocolMode::Both => true,
            ProtocolMode::Cdp => n.protocol() == DiscoveryProtocol::Cdp,
            ProtocolMode::Lldp => n.protocol() == DiscoveryProtocol::Lldp,
            ProtocolMode::Auto => {
                n.protocol() == DiscoveryProtocol::Cdp
                    || !neighbors.iter().any(|other| {
                        other.protocol() == DiscoveryProtocol::Cdp
                            && other.device_id == n.device_id
                            && other.local_interface == n.local_interface
                    })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdp::CdpRecord;
    use crate::lldp::LldpRecord;
    use std::time::SystemTime;

    fn cdp(device: &str, iface: &str) -> NeighborRecord {
        let record = CdpRecord {
            device_id: Some(device.to_string()),
            port_id: Some("Gi0/1".to_string()),
            ..Default::default()
        };
        NeighborRecord::from_cdp(record, iface, SystemTime::UNIX_EPOCH)
    }

    fn lldp(device: &str, iface: &str) -> NeighborRecord {
        let record = LldpRecord {
            system_name: Some(device.to_string()),
            port_id: Some("Gi0/1".to_string()),
            ..Default::default()
        };
        NeighborRecord::from_lldp(record, iface, SystemTime::UNIX_EPOCH)
    }

    fn ids(selected: Vec<&NeighborRecord>) -> Vec<String> {
        selected.iter().map(|n| n.key().to_string()).collect()
    }

    #[test]
    fn test_auto_hides_lldp_duplicates() {
        let neighbors = vec![
            cdp("sw1", "eth0"),
            lldp("sw1", "eth0"),
            lldp("sw1", "eth1"),
            lldp("ap2", "eth0"),
        ];
        assert_eq!(
            ids(select_neighbors(ProtocolMode::Auto, &neighbors)),
            vec!["CDP:eth0:sw1:Gi0/1", "LLDP:eth1:sw1:Gi0/1", "LLDP:eth0:ap2:Gi0/1"]
        );
    }

    #[test]
    fn test_single_protocol_modes() {
        let neighbors = vec![cdp("sw1", "eth0"), lldp("sw1", "eth0")];
        assert_eq!(select_neighbors(ProtocolMode::Both, &neighbors).len(), 2);
        assert_eq!(
            ids(select_neighbors(ProtocolMode::Cdp, &neighbors)),
            vec!["CDP:eth0:sw1:Gi0/1"]
        );
        assert_eq!(
            ids(select_neighbors(ProtocolMode::Lldp, &neighbors)),
            vec!["LLDP:eth0:sw1:Gi0/1"]
        );
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("AUTO".parse::<ProtocolMode>().unwrap(), ProtocolMode::Auto);
        assert_eq!("lldp".parse::<ProtocolMode>().unwrap(), ProtocolMode::Lldp);
        assert_eq!("all".parse::<ProtocolMode>().unwrap(), ProtocolMode::Both);
        assert!("stp".parse::<ProtocolMode>().is_err());
        assert_eq!(ProtocolMode::default().to_string(), "auto");
    }

    #[test]
    fn test_captures() {
        assert!(ProtocolMode::Auto.captures(DiscoveryProtocol::Lldp));
        assert!(!ProtocolMode::Cdp.captures(DiscoveryProtocol::Lldp));
        assert!(ProtocolMode::Lldp.captures(DiscoveryProtocol::Lldp));
    }
}
