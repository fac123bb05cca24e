//! LLDP wire constants, field types and the PDU builder

use bytes::{BufMut, BytesMut};
use linkscout_core::{ethertypes, multicast, MacAddr};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Default TTL (seconds)
pub const LLDP_TTL_DEFAULT: u16 = 120;

/// IEEE 802.1 organizationally unique identifier
pub const IEEE_802_1_OUI: [u8; 3] = [0x00, 0x80, 0xC2];

/// IEEE 802.3 organizationally unique identifier (recognized, not decoded)
pub const IEEE_802_3_OUI: [u8; 3] = [0x00, 0x12, 0x0F];

/// IEEE 802.1 subtype: Port VLAN ID
pub const IEEE_802_1_PORT_VLAN_ID: u8 = 1;

/// IEEE 802.1 subtype: VLAN Name
pub const IEEE_802_1_VLAN_NAME: u8 = 3;

/// Management address subtypes (IANA address family numbers)
pub const MGMT_ADDR_IPV4: u8 = 1;
pub const MGMT_ADDR_IPV6: u8 = 2;

/// LLDP TLV Types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LldpTlvType {
    EndOfLldpdu = 0,
    ChassisId = 1,
    PortId = 2,
    Ttl = 3,
    PortDescription = 4,
    SystemName = 5,
    SystemDescription = 6,
    SystemCapabilities = 7,
    ManagementAddress = 8,
    OrganizationallySpecific = 127,
}

impl LldpTlvType {
    /// Map a 7-bit type code to a known TLV type
    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            0 => LldpTlvType::EndOfLldpdu,
            1 => LldpTlvType::ChassisId,
            2 => LldpTlvType::PortId,
            3 => LldpTlvType::Ttl,
            4 => LldpTlvType::PortDescription,
            5 => LldpTlvType::SystemName,
            6 => LldpTlvType::SystemDescription,
            7 => LldpTlvType::SystemCapabilities,
            8 => LldpTlvType::ManagementAddress,
            127 => LldpTlvType::OrganizationallySpecific,
            _ => return None,
        })
    }
}

/// Chassis ID Subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChassisIdSubtype {
    Reserved = 0,
    ChassisComponent = 1,
    InterfaceAlias = 2,
    PortComponent = 3,
    MacAddress = 4,
    NetworkAddress = 5,
    InterfaceName = 6,
    LocallyAssigned = 7,
}

/// Port ID Subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PortIdSubtype {
    Reserved = 0,
    InterfaceAlias = 1,
    PortComponent = 2,
    MacAddress = 3,
    NetworkAddress = 4,
    InterfaceName = 5,
    AgentCircuitId = 6,
    LocallyAssigned = 7,
}

/// System Capabilities (bitmap)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LldpCapabilities(pub u16);

impl LldpCapabilities {
    pub const OTHER: u16 = 0x0001;
    pub const REPEATER: u16 = 0x0002;
    pub const BRIDGE: u16 = 0x0004;
    pub const WLAN_ACCESS_POINT: u16 = 0x0008;
    pub const ROUTER: u16 = 0x0010;
    pub const TELEPHONE: u16 = 0x0020;
    pub const DOCSIS: u16 = 0x0040;
    pub const STATION_ONLY: u16 = 0x0080;
    pub const C_VLAN: u16 = 0x0100;
    pub const S_VLAN: u16 = 0x0200;
    pub const TPMR: u16 = 0x0400;

    const NAMES: [(u16, &'static str); 11] = [
        (Self::OTHER, "Other"),
        (Self::REPEATER, "Repeater"),
        (Self::BRIDGE, "Bridge"),
        (Self::WLAN_ACCESS_POINT, "WLAN AP"),
        (Self::ROUTER, "Router"),
        (Self::TELEPHONE, "Telephone"),
        (Self::DOCSIS, "DOCSIS"),
        (Self::STATION_ONLY, "Station"),
        (Self::C_VLAN, "C-VLAN"),
        (Self::S_VLAN, "S-VLAN"),
        (Self::TPMR, "TPMR"),
    ];

    pub fn contains(&self, flag: u16) -> bool {
        self.0 & flag != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Names of the set flags, lowest bit first
    pub fn names(&self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

/// LLDP TLV (Type-Length-Value)
#[derive(Debug, Clone, PartialEq)]
pub struct LldpTlv {
    pub tlv_type: LldpTlvType,
    pub value: Vec<u8>,
}

impl LldpTlv {
    pub fn new(tlv_type: LldpTlvType, value: Vec<u8>) -> Self {
        Self { tlv_type, value }
    }

    pub fn chassis_id(subtype: ChassisIdSubtype, id: &[u8]) -> Self {
        let mut value = Vec::with_capacity(id.len() + 1);
        value.push(subtype as u8);
        value.extend_from_slice(id);
        Self::new(LldpTlvType::ChassisId, value)
    }

    pub fn chassis_id_mac(mac: MacAddr) -> Self {
        Self::chassis_id(ChassisIdSubtype::MacAddress, mac.as_bytes())
    }

    pub fn port_id(subtype: PortIdSubtype, id: &[u8]) -> Self {
        let mut value = Vec::with_capacity(id.len() + 1);
        value.push(subtype as u8);
        value.extend_from_slice(id);
        Self::new(LldpTlvType::PortId, value)
    }

    pub fn port_id_interface(name: &str) -> Self {
        Self::port_id(PortIdSubtype::InterfaceName, name.as_bytes())
    }

    pub fn ttl(seconds: u16) -> Self {
        Self::new(LldpTlvType::Ttl, seconds.to_be_bytes().to_vec())
    }

    pub fn port_description(desc: &str) -> Self {
        Self::new(LldpTlvType::PortDescription, desc.as_bytes().to_vec())
    }

    pub fn system_name(name: &str) -> Self {
        Self::new(LldpTlvType::SystemName, name.as_bytes().to_vec())
    }

    pub fn system_description(desc: &str) -> Self {
        Self::new(LldpTlvType::SystemDescription, desc.as_bytes().to_vec())
    }

    pub fn system_capabilities(supported: u16, enabled: u16) -> Self {
        let mut value = Vec::with_capacity(4);
        value.extend_from_slice(&supported.to_be_bytes());
        value.extend_from_slice(&enabled.to_be_bytes());
        Self::new(LldpTlvType::SystemCapabilities, value)
    }

    /// Management address with an ifIndex interface numbering and no OID
    fn management_address(subtype: u8, addr: &[u8]) -> Self {
        let mut value = BytesMut::with_capacity(addr.len() + 8);
        value.put_u8((addr.len() + 1) as u8);
        value.put_u8(subtype);
        value.put_slice(addr);
        value.put_u8(2); // interface numbering: ifIndex
        value.put_u32(0);
        value.put_u8(0); // OID length
        Self::new(LldpTlvType::ManagementAddress, value.to_vec())
    }

    pub fn management_ipv4(addr: Ipv4Addr) -> Self {
        Self::management_address(MGMT_ADDR_IPV4, &addr.octets())
    }

    pub fn management_ipv6(addr: Ipv6Addr) -> Self {
        Self::management_address(MGMT_ADDR_IPV6, &addr.octets())
    }

    pub fn org_specific(oui: [u8; 3], subtype: u8, payload: &[u8]) -> Self {
        let mut value = Vec::with_capacity(payload.len() + 4);
        value.extend_from_slice(&oui);
        value.push(subtype);
        value.extend_from_slice(payload);
        Self::new(LldpTlvType::OrganizationallySpecific, value)
    }

    pub fn port_vlan_id(vlan: u16) -> Self {
        Self::org_specific(IEEE_802_1_OUI, IEEE_802_1_PORT_VLAN_ID, &vlan.to_be_bytes())
    }

    pub fn vlan_name(vlan: u16, name: &str) -> Self {
        let mut payload = Vec::with_capacity(name.len() + 3);
        payload.extend_from_slice(&vlan.to_be_bytes());
        payload.push(name.len() as u8);
        payload.extend_from_slice(name.as_bytes());
        Self::org_specific(IEEE_802_1_OUI, IEEE_802_1_VLAN_NAME, &payload)
    }

    pub fn end_of_lldpdu() -> Self {
        Self::new(LldpTlvType::EndOfLldpdu, vec![])
    }

    /// Encode TLV to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let len = self.value.len();
        let mut bytes = Vec::with_capacity(2 + len);

        // Type (7 bits) | Length (9 bits)
        let type_length = ((self.tlv_type as u16) << 9) | (len as u16 & 0x1FF);
        bytes.extend_from_slice(&type_length.to_be_bytes());
        bytes.extend_from_slice(&self.value);

        bytes
    }
}

/// LLDPDU builder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LldpPdu {
    pub tlvs: Vec<LldpTlv>,
}

impl LldpPdu {
    pub fn new() -> Self {
        Self { tlvs: Vec::new() }
    }

    /// Mandatory TLVs: MAC chassis id, interface-name port id, TTL
    pub fn new_basic(chassis: MacAddr, port_id: &str, ttl: u16) -> Self {
        Self::new()
            .add_tlv(LldpTlv::chassis_id_mac(chassis))
            .add_tlv(LldpTlv::port_id_interface(port_id))
            .add_tlv(LldpTlv::ttl(ttl))
    }

    pub fn add_tlv(mut self, tlv: LldpTlv) -> Self {
        self.tlvs.push(tlv);
        self
    }

    /// Encode TLVs followed by an End TLV
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = BytesMut::new();
        for tlv in &self.tlvs {
            bytes.put_slice(&tlv.to_bytes());
        }
        if self.tlvs.last().map(|t| t.tlv_type) != Some(LldpTlvType::EndOfLldpdu) {
            bytes.put_slice(&LldpTlv::end_of_lldpdu().to_bytes());
        }
        bytes.to_vec()
    }

    /// Wrap in an Ethernet II frame to the nearest-bridge address
    pub fn to_frame(&self, source: MacAddr) -> Vec<u8> {
        self.to_frame_to(multicast::LLDP_NEAREST_BRIDGE, source)
    }

    pub fn to_frame_to(&self, destination: MacAddr, source: MacAddr) -> Vec<u8> {
        let mut frame = BytesMut::new();
        frame.put_slice(destination.as_bytes());
        frame.put_slice(source.as_bytes());
        frame.put_u16(ethertypes::LLDP);
        frame.put_slice(&self.to_bytes());
        frame.to_vec()
    }
}
