//! LLDP frame decoding

use std::net::Ipv4Addr;

use linkscout_core::{ethertypes, MacAddr, ETHERNET_HEADER_LEN};
use tracing::{debug, trace};

use super::packet::*;
use crate::tlv::{be_u16, decode_field, decode_text, LldpTlvIter};

/// Fields decoded from one LLDPDU
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LldpRecord {
    pub source_mac: Option<MacAddr>,
    pub chassis_id: Option<String>,
    pub port_id: Option<String>,
    pub ttl: Option<u16>,
    pub port_description: Option<String>,
    pub system_name: Option<String>,
    pub system_description: Option<String>,
    pub capabilities: Option<LldpCapabilities>,
    pub enabled_capabilities: Option<LldpCapabilities>,
    pub mgmt_addresses: Vec<String>,
    pub vlan_id: Option<u16>,
    pub vlan_name: Option<String>,
}

/// Decode a raw Ethernet frame carrying an LLDPDU
///
/// Returns `None` unless the EtherType is 0x88CC. An End TLV or a TLV that
/// overruns the frame ends the walk; fields decoded before it are kept.
pub fn decode(data: &[u8]) -> Option<LldpRecord> {
    if be_u16(data, 12) != Some(ethertypes::LLDP) {
        debug!(len = data.len(), "not an LLDP frame");
        return None;
    }

    let mut record = LldpRecord {
        source_mac: data.get(6..12).and_then(MacAddr::from_slice),
        ..Default::default()
    };

    for tlv in LldpTlvIter::new(data, ETHERNET_HEADER_LEN) {
        let tlv = match tlv {
            Ok(tlv) => tlv,
            Err(e) => {
                debug!(error = %e, "stopping LLDP TLV walk");
                break;
            }
        };

        let value = tlv.payload;
        match LldpTlvType::from_code(tlv.tlv_type) {
            Some(LldpTlvType::ChassisId) if value.len() >= 2 => {
                record.chassis_id = Some(parse_chassis_id(value[0], &value[1..]));
            }
            Some(LldpTlvType::PortId) if value.len() >= 2 => {
                record.port_id = Some(parse_port_id(value[0], &value[1..]));
            }
            Some(LldpTlvType::Ttl) => {
                if let Some(ttl) = be_u16(value, 0) {
                    record.ttl = Some(ttl);
                }
            }
            Some(LldpTlvType::PortDescription) => record.port_description = decode_field(value),
            Some(LldpTlvType::SystemName) => record.system_name = decode_field(value),
            Some(LldpTlvType::SystemDescription) => {
                record.system_description = decode_field(value)
            }
            Some(LldpTlvType::SystemCapabilities) => {
                if let (Some(supported), Some(enabled)) = (be_u16(value, 0), be_u16(value, 2)) {
                    record.capabilities = Some(LldpCapabilities(supported));
                    record.enabled_capabilities = Some(LldpCapabilities(enabled));
                }
            }
            Some(LldpTlvType::ManagementAddress) => {
                if let Some(addr) = parse_mgmt_address(value) {
                    record.mgmt_addresses.push(addr);
                }
            }
            Some(LldpTlvType::OrganizationallySpecific) if value.len() >= 4 => {
                parse_org_specific(&mut record, value);
            }
            _ => trace!(tlv_type = tlv.tlv_type, len = tlv.length, "skipping LLDP TLV"),
        }
    }

    Some(record)
}

/// Render a chassis id according to its subtype
pub fn parse_chassis_id(subtype: u8, data: &[u8]) -> String {
    parse_id(
        subtype,
        ChassisIdSubtype::MacAddress as u8,
        ChassisIdSubtype::NetworkAddress as u8,
        data,
    )
}

/// Render a port id according to its subtype
///
/// Network-address port ids accept IPv6 as well as IPv4, same as chassis ids.
pub fn parse_port_id(subtype: u8, data: &[u8]) -> String {
    parse_id(
        subtype,
        PortIdSubtype::MacAddress as u8,
        PortIdSubtype::NetworkAddress as u8,
        data,
    )
}

fn parse_id(subtype: u8, mac_subtype: u8, network_subtype: u8, data: &[u8]) -> String {
    if subtype == mac_subtype {
        if let Some(mac) = MacAddr::from_slice(data).filter(|_| data.len() == 6) {
            return mac.to_string();
        }
    }

    if subtype == network_subtype {
        // Family 1 (IPv4) or 2 (IPv6); anything else renders as text/hex
        if let Some((&family, addr)) = data.split_first() {
            if let Some(rendered) = render_address(family, addr) {
                return rendered;
            }
        }
    }

    match std::str::from_utf8(data) {
        Ok(text) => text.trim_matches('\0').to_string(),
        Err(_) => hex::encode(data),
    }
}

/// Render an address of IANA family 1 (IPv4) or 2 (IPv6)
///
/// IPv6 is rendered as eight uncompressed 4-digit groups. Extra trailing
/// bytes are ignored.
fn render_address(family: u8, addr: &[u8]) -> Option<String> {
    match family {
        MGMT_ADDR_IPV4 if addr.len() >= 4 => {
            Some(Ipv4Addr::new(addr[0], addr[1], addr[2], addr[3]).to_string())
        }
        MGMT_ADDR_IPV6 if addr.len() >= 16 => Some(
            addr[..16]
                .chunks_exact(2)
                .map(|group| hex::encode(group))
                .collect::<Vec<_>>()
                .join(":"),
        ),
        _ => None,
    }
}

/// Parse a Management Address TLV payload
///
/// Layout: address string length (subtype + address), subtype, address, then
/// interface numbering and OID which are not decoded.
pub fn parse_mgmt_address(data: &[u8]) -> Option<String> {
    if data.len() < 3 {
        return None;
    }

    let addr_len = data[0] as usize;
    if addr_len < 2 || data.len() < addr_len + 1 {
        return None;
    }

    render_address(data[1], &data[2..addr_len + 1])
}

fn parse_org_specific(record: &mut LldpRecord, value: &[u8]) {
    let oui = [value[0], value[1], value[2]];
    let subtype = value[3];
    let org = &value[4..];

    match oui {
        IEEE_802_1_OUI => match subtype {
            IEEE_802_1_PORT_VLAN_ID => {
                if let Some(vlan) = be_u16(org, 0) {
                    record.vlan_id = Some(vlan);
                }
            }
            IEEE_802_1_VLAN_NAME if org.len() >= 3 => {
                let vlan = be_u16(org, 0);
                let name_len = org[2] as usize;
                if let Some(name) = org.get(3..3 + name_len) {
                    record.vlan_name = Some(decode_text(name));
                }
                if record.vlan_id.is_none() {
                    record.vlan_id = vlan;
                }
            }
            _ => trace!(subtype, "skipping IEEE 802.1 TLV"),
        },
        IEEE_802_3_OUI => trace!(subtype, "skipping IEEE 802.3 TLV"),
        _ => trace!(oui = %hex::encode(oui), subtype, "skipping vendor TLV"),
    }
}
