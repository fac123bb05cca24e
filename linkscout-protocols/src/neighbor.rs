//! Unified neighbor records and the CDP/LLDP normalizer

use std::fmt;
use std::net::Ipv4Addr;
use std::time::SystemTime;

use linkscout_core::{DiscoveryProtocol, MacAddr};

use crate::cdp::{CdpRecord, Duplex};
use crate::lldp::{LldpRecord, LLDP_TTL_DEFAULT};

/// Longest platform string derived from an LLDP system description
pub const PLATFORM_MAX_CHARS: usize = 50;

/// Fields only one of the two protocols carries
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolDetails {
    Cdp {
        ip_addresses: Vec<Ipv4Addr>,
        voice_vlan: Option<u16>,
        duplex: Option<Duplex>,
        vtp_domain: Option<String>,
    },
    Lldp {
        chassis_id: Option<String>,
        port_description: Option<String>,
        vlan_name: Option<String>,
    },
}

/// A neighbor observed on a local link, independent of protocol
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborRecord {
    pub device_id: String,
    pub port_id: String,
    /// Local interface the advertisement arrived on
    pub local_interface: String,
    pub platform: Option<String>,
    pub software_version: Option<String>,
    pub capabilities: Vec<&'static str>,
    pub mgmt_addresses: Vec<String>,
    pub native_vlan: Option<u16>,
    pub source_mac: Option<MacAddr>,
    /// Speed of the local link, stamped by the coordinator ("1G", "100M", ...)
    pub local_port_speed: Option<String>,
    /// Advertised hold time in seconds
    pub ttl: u16,
    pub last_seen: SystemTime,
    pub details: ProtocolDetails,
}

impl NeighborRecord {
    /// Normalize a CDP record
    pub fn from_cdp(record: CdpRecord, local_interface: &str, seen: SystemTime) -> Self {
        let capabilities = record.capability_names();
        Self {
            device_id: record.device_id.unwrap_or_default(),
            port_id: record.port_id.unwrap_or_default(),
            local_interface: local_interface.to_string(),
            platform: record.platform,
            software_version: record.software_version,
            capabilities,
            mgmt_addresses: record.mgmt_addresses.iter().map(Ipv4Addr::to_string).collect(),
            native_vlan: record.native_vlan,
            source_mac: record.source_mac,
            local_port_speed: None,
            ttl: record.ttl as u16,
            last_seen: seen,
            details: ProtocolDetails::Cdp {
                ip_addresses: record.ip_addresses,
                voice_vlan: record.voice_vlan,
                duplex: record.duplex,
                vtp_domain: record.vtp_domain,
            },
        }
    }

    /// Normalize an LLDP record
    ///
    /// The system name identifies the device when present, the chassis id
    /// otherwise. Enabled capabilities win over supported ones.
    pub fn from_lldp(record: LldpRecord, local_interface: &str, seen: SystemTime) -> Self {
        let device_id = record
            .system_name
            .clone()
            .filter(|name| !name.is_empty())
            .or_else(|| record.chassis_id.clone())
            .unwrap_or_default();

        let platform = record.system_description.as_deref().and_then(platform_from_description);

        let capabilities = match (record.enabled_capabilities, record.capabilities) {
            (Some(enabled), _) if !enabled.is_empty() => enabled.names(),
            (_, Some(supported)) => supported.names(),
            _ => Vec::new(),
        };

        Self {
            device_id,
            port_id: record.port_id.unwrap_or_default(),
            local_interface: local_interface.to_string(),
            platform,
            software_version: record.system_description,
            capabilities,
            mgmt_addresses: record.mgmt_addresses,
            native_vlan: record.vlan_id,
            source_mac: record.source_mac,
            local_port_speed: None,
            ttl: record.ttl.unwrap_or(LLDP_TTL_DEFAULT),
            last_seen: seen,
            details: ProtocolDetails::Lldp {
                chassis_id: record.chassis_id,
                port_description: record.port_description,
                vlan_name: record.vlan_name,
            },
        }
    }

    pub fn protocol(&self) -> DiscoveryProtocol {
        match self.details {
            ProtocolDetails::Cdp { .. } => DiscoveryProtocol::Cdp,
            ProtocolDetails::Lldp { .. } => DiscoveryProtocol::Lldp,
        }
    }

    /// Identity used for deduplication
    pub fn key(&self) -> NeighborKey {
        NeighborKey {
            protocol: self.protocol(),
            local_interface: self.local_interface.clone(),
            device_id: self.device_id.clone(),
            port_id: self.port_id.clone(),
        }
    }

    /// CDP IP addresses; empty for LLDP
    pub fn ip_addresses(&self) -> &[Ipv4Addr] {
        match &self.details {
            ProtocolDetails::Cdp { ip_addresses, .. } => ip_addresses,
            ProtocolDetails::Lldp { .. } => &[],
        }
    }

    /// Best address to show: first IP address, else first management address
    pub fn display_ip(&self) -> Option<String> {
        self.ip_addresses()
            .first()
            .map(Ipv4Addr::to_string)
            .or_else(|| self.mgmt_addresses.first().cloned())
    }

    /// IP and management addresses, de-duplicated, in first-seen order
    pub fn all_addresses(&self) -> Vec<String> {
        let mut all: Vec<String> = Vec::new();
        let ips = self.ip_addresses().iter().map(Ipv4Addr::to_string);
        for addr in ips.chain(self.mgmt_addresses.iter().cloned()) {
            if !all.contains(&addr) {
                all.push(addr);
            }
        }
        all
    }

    /// Set the local link speed
    pub fn with_local_port_speed<S: Into<String>>(mut self, speed: S) -> Self {
        self.local_port_speed = Some(speed.into());
        self
    }
}

/// First line of a system description, at most [`PLATFORM_MAX_CHARS`] characters
fn platform_from_description(description: &str) -> Option<String> {
    let first = description.lines().next()?;
    let platform: String = first.chars().take(PLATFORM_MAX_CHARS).collect();
    if platform.is_empty() {
        None
    } else {
        Some(platform)
    }
}

/// (protocol, local interface, device id, port id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NeighborKey {
    pub protocol: DiscoveryProtocol,
    pub local_interface: String,
    pub device_id: String,
    pub port_id: String,
}

impl fmt::Display for NeighborKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.protocol, self.local_interface, self.device_id, self.port_id
        )
    }
}
