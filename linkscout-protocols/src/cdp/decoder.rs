//! CDP frame decoding

use std::net::Ipv4Addr;

use linkscout_core::{MacAddr, ETHERNET_HEADER_LEN};
use tracing::{debug, trace};

use super::packet::*;
use crate::tlv::{be_u16, be_u32, decode_field, CdpTlvIter};

/// Fields decoded from one CDP advertisement
///
/// Fields never seen in the frame stay `None` / empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CdpRecord {
    pub version: u8,
    pub ttl: u8,
    pub source_mac: Option<MacAddr>,
    pub device_id: Option<String>,
    pub port_id: Option<String>,
    pub platform: Option<String>,
    pub software_version: Option<String>,
    pub vtp_domain: Option<String>,
    pub ip_addresses: Vec<Ipv4Addr>,
    pub mgmt_addresses: Vec<Ipv4Addr>,
    pub capabilities: Option<CdpCapabilities>,
    pub native_vlan: Option<u16>,
    pub voice_vlan: Option<u16>,
    pub duplex: Option<Duplex>,
}

impl CdpRecord {
    /// Capability names, empty when no capabilities TLV was present
    pub fn capability_names(&self) -> Vec<&'static str> {
        self.capabilities
            .map(|caps| caps.names())
            .unwrap_or_default()
    }
}

/// Locate the CDP header (version byte) within a raw Ethernet frame
///
/// Tries the standard LLC/SNAP layout first, then scans offsets 14..50 for a
/// version/TTL pair followed by a DeviceID TLV header.
pub fn find_header(data: &[u8]) -> Option<usize> {
    if data.len() >= CDP_STANDARD_OFFSET + 4
        && data[14..17] == LLC_SNAP_HEADER
        && data[17..20] == CISCO_OUI
        && data[20..22] == CDP_SNAP_PROTOCOL
    {
        return Some(CDP_STANDARD_OFFSET);
    }

    let end = data.len().saturating_sub(4).min(50);
    (ETHERNET_HEADER_LEN..end).find(|&i| {
        (data[i] == 0x01 || data[i] == 0x02)
            && data[i + 1] > 0
            && i + 8 <= data.len()
            && be_u16(data, i + 4) == Some(CDP_TYPE_DEVID)
            && be_u16(data, i + 6).is_some_and(|len| len > 4 && len < 256)
    })
}

/// Decode a raw Ethernet frame carrying CDP
///
/// Returns `None` when no CDP header can be located. A malformed TLV ends
/// the walk; fields decoded before it are kept.
pub fn decode(data: &[u8]) -> Option<CdpRecord> {
    let start = match find_header(data) {
        Some(offset) => offset,
        None => {
            debug!(len = data.len(), "no CDP header found in frame");
            return None;
        }
    };

    if data.len() < start + 4 {
        return None;
    }

    let mut record = CdpRecord {
        version: data[start],
        ttl: data[start + 1],
        source_mac: data.get(6..12).and_then(MacAddr::from_slice),
        ..Default::default()
    };

    for tlv in CdpTlvIter::new(data, start + 4) {
        let tlv = match tlv {
            Ok(tlv) => tlv,
            Err(e) => {
                debug!(error = %e, "stopping CDP TLV walk");
                break;
            }
        };

        let value = tlv.payload;
        match tlv.tlv_type {
            CDP_TYPE_DEVID => record.device_id = decode_field(value),
            CDP_TYPE_PORTID => record.port_id = decode_field(value),
            CDP_TYPE_PLATFORM => record.platform = decode_field(value),
            CDP_TYPE_VERSION => record.software_version = decode_field(value),
            CDP_TYPE_VTP_MGMT_DOMAIN => record.vtp_domain = decode_field(value),
            CDP_TYPE_ADDRESS => record.ip_addresses = parse_addresses(value),
            CDP_TYPE_MANAGEMENT_ADDR => record.mgmt_addresses = parse_addresses(value),
            CDP_TYPE_CAPABILITY => {
                if let Some(bits) = be_u32(value, 0) {
                    record.capabilities = Some(CdpCapabilities::from_bits(bits));
                }
            }
            CDP_TYPE_NATIVE_VLAN => {
                if let Some(vlan) = be_u16(value, 0) {
                    record.native_vlan = Some(vlan);
                }
            }
            CDP_TYPE_VOIP_VLAN_REPLY => {
                // 1-byte flag then VLAN id; some senders omit the flag
                let vlan = match value.len() {
                    0 | 1 => None,
                    2 => be_u16(value, 0),
                    _ => be_u16(value, 1),
                };
                if vlan.is_some() {
                    record.voice_vlan = vlan;
                }
            }
            CDP_TYPE_DUPLEX => {
                if let Some(&b) = value.first() {
                    record.duplex = Some(Duplex::from_u8(b));
                }
            }
            other => trace!(tlv_type = other, len = tlv.length, "skipping CDP TLV"),
        }
    }

    Some(record)
}

/// Parse an Address / Management Address TLV payload
///
/// Only 4-byte (IPv4) entries are kept. A truncated entry ends the list.
pub fn parse_addresses(data: &[u8]) -> Vec<Ipv4Addr> {
    let mut addresses = Vec::new();

    let count = match be_u32(data, 0) {
        Some(count) => count,
        None => return addresses,
    };

    let mut offset = 4;
    for _ in 0..count {
        // protocol type, protocol length
        let proto_len = match data.get(offset + 1) {
            Some(&len) => len as usize,
            None => break,
        };
        offset += 2 + proto_len;

        let addr_len = match be_u16(data, offset) {
            Some(len) => len as usize,
            None => break,
        };
        offset += 2;

        let addr = match data.get(offset..offset + addr_len) {
            Some(addr) => addr,
            None => break,
        };
        if let [a, b, c, d] = *addr {
            addresses.push(Ipv4Addr::new(a, b, c, d));
        }
        offset += addr_len;
    }

    addresses
}

impl From<&CdpRecord> for CdpPdu {
    fn from(record: &CdpRecord) -> Self {
        let mut pdu = CdpPdu::new()
            .with_version(record.version)
            .with_ttl(record.ttl);

        if let Some(id) = &record.device_id {
            pdu = pdu.add_tlv(CdpTlv::DeviceId(id.clone()));
        }
        if !record.ip_addresses.is_empty() {
            pdu = pdu.add_tlv(CdpTlv::Addresses(record.ip_addresses.clone()));
        }
        if let Some(port) = &record.port_id {
            pdu = pdu.add_tlv(CdpTlv::PortId(port.clone()));
        }
        if let Some(caps) = record.capabilities {
            pdu = pdu.add_tlv(CdpTlv::Capabilities(caps));
        }
        if let Some(version) = &record.software_version {
            pdu = pdu.add_tlv(CdpTlv::SoftwareVersion(version.clone()));
        }
        if let Some(platform) = &record.platform {
            pdu = pdu.add_tlv(CdpTlv::Platform(platform.clone()));
        }
        if let Some(domain) = &record.vtp_domain {
            pdu = pdu.add_tlv(CdpTlv::VtpMgmtDomain(domain.clone()));
        }
        if let Some(vlan) = record.native_vlan {
            pdu = pdu.add_tlv(CdpTlv::NativeVlan(vlan));
        }
        if let Some(duplex) = record.duplex {
            pdu = pdu.add_tlv(CdpTlv::Duplex(duplex));
        }
        if let Some(vlan) = record.voice_vlan {
            pdu = pdu.add_tlv(CdpTlv::VoiceVlan(vlan));
        }
        if !record.mgmt_addresses.is_empty() {
            pdu = pdu.add_tlv(CdpTlv::ManagementAddresses(record.mgmt_addresses.clone()));
        }

        pdu
    }
}
