//! CDP wire constants, field types and the PDU builder
//!
//! The builder produces bit-exact CDP payloads (and full 802.3 + LLC/SNAP
//! frames) for any set of decoded fields. It is what the test suites use to
//! produce fixtures, and what a [`CdpRecord`](super::CdpRecord) is re-encoded
//! through.

use bytes::{BufMut, BytesMut};
use linkscout_core::{multicast, MacAddr};
use std::fmt;
use std::net::Ipv4Addr;

/// CDP protocol version emitted by the builder
pub const CDP_VERSION: u8 = 0x02;

/// Default TTL in seconds
pub const CDP_TTL_DEFAULT: u8 = 180;

/// LLC header carried by CDP frames: DSAP, SSAP, control
pub const LLC_SNAP_HEADER: [u8; 3] = [0xAA, 0xAA, 0x03];

/// Cisco OUI in the SNAP header
pub const CISCO_OUI: [u8; 3] = [0x00, 0x00, 0x0C];

/// SNAP protocol id for CDP
pub const CDP_SNAP_PROTOCOL: [u8; 2] = [0x20, 0x00];

/// Offset of the CDP header in a standard 802.3 + LLC/SNAP frame
pub const CDP_STANDARD_OFFSET: usize = 22;

/// CDP TLV type constants
pub const CDP_TYPE_DEVID: u16 = 0x0001;
pub const CDP_TYPE_ADDRESS: u16 = 0x0002;
pub const CDP_TYPE_PORTID: u16 = 0x0003;
pub const CDP_TYPE_CAPABILITY: u16 = 0x0004;
pub const CDP_TYPE_VERSION: u16 = 0x0005;
pub const CDP_TYPE_PLATFORM: u16 = 0x0006;
pub const CDP_TYPE_IPPREFIX: u16 = 0x0007;
pub const CDP_TYPE_VTP_MGMT_DOMAIN: u16 = 0x0009;
pub const CDP_TYPE_NATIVE_VLAN: u16 = 0x000A;
pub const CDP_TYPE_DUPLEX: u16 = 0x000B;
pub const CDP_TYPE_VOIP_VLAN_REPLY: u16 = 0x000E;
pub const CDP_TYPE_TRUST_BITMAP: u16 = 0x0012;
pub const CDP_TYPE_UNTRUSTED_COS: u16 = 0x0013;
pub const CDP_TYPE_MANAGEMENT_ADDR: u16 = 0x0016;
pub const CDP_TYPE_POWER_AVAILABLE: u16 = 0x001A;

/// NLPID protocol type used for IPv4 entries in address lists
const ADDRESS_PROTO_NLPID: u8 = 0x01;
/// NLPID value for IP
const ADDRESS_NLPID_IP: u8 = 0xCC;

/// CDP device capabilities bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CdpCapabilities {
    bits: u32,
}

impl CdpCapabilities {
    pub const ROUTER: u32 = 0x01;
    pub const TRANSPARENT_BRIDGE: u32 = 0x02;
    pub const SOURCE_ROUTE_BRIDGE: u32 = 0x04;
    pub const SWITCH: u32 = 0x08;
    pub const HOST: u32 = 0x10;
    pub const IGMP: u32 = 0x20;
    pub const REPEATER: u32 = 0x40;

    /// Display names in bit order
    const NAMES: [(u32, &'static str); 7] = [
        (Self::ROUTER, "Router"),
        (Self::TRANSPARENT_BRIDGE, "Trans-Bridge"),
        (Self::SOURCE_ROUTE_BRIDGE, "Source-Bridge"),
        (Self::SWITCH, "Switch"),
        (Self::HOST, "Host"),
        (Self::IGMP, "IGMP"),
        (Self::REPEATER, "Repeater"),
    ];

    pub fn from_bits(bits: u32) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn contains(&self, flag: u32) -> bool {
        self.bits & flag != 0
    }

    /// Names of the set flags, lowest bit first. Unassigned bits are ignored.
    pub fn names(&self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

/// Duplex advertised by the neighbor's port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duplex {
    Half,
    Full,
}

impl Duplex {
    pub fn to_u8(self) -> u8 {
        match self {
            Duplex::Half => 0x00,
            Duplex::Full => 0x01,
        }
    }

    /// Any nonzero value means full duplex
    pub fn from_u8(val: u8) -> Self {
        if val != 0 {
            Duplex::Full
        } else {
            Duplex::Half
        }
    }
}

impl fmt::Display for Duplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Duplex::Half => f.write_str("Half"),
            Duplex::Full => f.write_str("Full"),
        }
    }
}

/// A single CDP TLV to encode
#[derive(Debug, Clone, PartialEq)]
pub enum CdpTlv {
    DeviceId(String),
    Addresses(Vec<Ipv4Addr>),
    PortId(String),
    Capabilities(CdpCapabilities),
    SoftwareVersion(String),
    Platform(String),
    VtpMgmtDomain(String),
    NativeVlan(u16),
    Duplex(Duplex),
    /// Voice VLAN reply, encoded with the leading 1-byte flag
    VoiceVlan(u16),
    ManagementAddresses(Vec<Ipv4Addr>),
}

impl CdpTlv {
    /// Get the TLV type code
    pub fn type_code(&self) -> u16 {
        match self {
            CdpTlv::DeviceId(_) => CDP_TYPE_DEVID,
            CdpTlv::Addresses(_) => CDP_TYPE_ADDRESS,
            CdpTlv::PortId(_) => CDP_TYPE_PORTID,
            CdpTlv::Capabilities(_) => CDP_TYPE_CAPABILITY,
            CdpTlv::SoftwareVersion(_) => CDP_TYPE_VERSION,
            CdpTlv::Platform(_) => CDP_TYPE_PLATFORM,
            CdpTlv::VtpMgmtDomain(_) => CDP_TYPE_VTP_MGMT_DOMAIN,
            CdpTlv::NativeVlan(_) => CDP_TYPE_NATIVE_VLAN,
            CdpTlv::Duplex(_) => CDP_TYPE_DUPLEX,
            CdpTlv::VoiceVlan(_) => CDP_TYPE_VOIP_VLAN_REPLY,
            CdpTlv::ManagementAddresses(_) => CDP_TYPE_MANAGEMENT_ADDR,
        }
    }

    fn encode(&self, buffer: &mut BytesMut) {
        let mut value = BytesMut::new();

        match self {
            CdpTlv::DeviceId(s)
            | CdpTlv::PortId(s)
            | CdpTlv::SoftwareVersion(s)
            | CdpTlv::Platform(s)
            | CdpTlv::VtpMgmtDomain(s) => value.put_slice(s.as_bytes()),
            CdpTlv::Addresses(addrs) | CdpTlv::ManagementAddresses(addrs) => {
                value.put_u32(addrs.len() as u32);
                for addr in addrs {
                    value.put_u8(ADDRESS_PROTO_NLPID);
                    value.put_u8(1); // protocol length
                    value.put_u8(ADDRESS_NLPID_IP);
                    value.put_u16(4);
                    value.put_slice(&addr.octets());
                }
            }
            CdpTlv::Capabilities(caps) => value.put_u32(caps.bits()),
            CdpTlv::NativeVlan(vlan) => value.put_u16(*vlan),
            CdpTlv::Duplex(mode) => value.put_u8(mode.to_u8()),
            CdpTlv::VoiceVlan(vlan) => {
                value.put_u8(0x01);
                value.put_u16(*vlan);
            }
        }

        buffer.put_u16(self.type_code());
        buffer.put_u16((4 + value.len()) as u16);
        buffer.put_slice(&value);
    }
}

/// CDP PDU builder: header plus TLV chain
#[derive(Debug, Clone, PartialEq)]
pub struct CdpPdu {
    pub version: u8,
    pub ttl: u8,
    pub tlvs: Vec<CdpTlv>,
}

impl CdpPdu {
    /// Create a new PDU with default version and TTL
    pub fn new() -> Self {
        Self {
            version: CDP_VERSION,
            ttl: CDP_TTL_DEFAULT,
            tlvs: Vec::new(),
        }
    }

    /// Add a TLV to the PDU
    pub fn add_tlv(mut self, tlv: CdpTlv) -> Self {
        self.tlvs.push(tlv);
        self
    }

    pub fn with_version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    pub fn with_ttl(mut self, ttl: u8) -> Self {
        self.ttl = ttl;
        self
    }

    /// Encode header and TLVs, checksum filled in
    pub fn build(&self) -> Vec<u8> {
        let mut buffer = BytesMut::new();

        buffer.put_u8(self.version);
        buffer.put_u8(self.ttl);
        buffer.put_u16(0); // checksum placeholder

        for tlv in &self.tlvs {
            tlv.encode(&mut buffer);
        }

        let checksum = calculate_checksum(&buffer);
        buffer[2..4].copy_from_slice(&checksum.to_be_bytes());

        buffer.to_vec()
    }

    /// Wrap the PDU in an 802.3 + LLC/SNAP frame sent to the CDP multicast
    pub fn to_frame(&self, source: MacAddr) -> Vec<u8> {
        let pdu = self.build();
        let mut frame = BytesMut::with_capacity(CDP_STANDARD_OFFSET + pdu.len());

        frame.put_slice(multicast::CDP.as_bytes());
        frame.put_slice(source.as_bytes());
        // 802.3 length field counts LLC/SNAP plus payload
        frame.put_u16((8 + pdu.len()) as u16);
        frame.put_slice(&LLC_SNAP_HEADER);
        frame.put_slice(&CISCO_OUI);
        frame.put_slice(&CDP_SNAP_PROTOCOL);
        frame.put_slice(&pdu);

        frame.to_vec()
    }
}

impl Default for CdpPdu {
    fn default() -> Self {
        Self::new()
    }
}

/// CDP checksum (RFC 1071 one's complement sum)
///
/// Odd trailing bytes are padded on the right, as IOS does.
pub fn calculate_checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;

    let mut chunks = data.chunks_exact(2);
    for word in &mut chunks {
        sum += u16::from_be_bytes([word[0], word[1]]) as u32;
    }
    if let [last] = chunks.remainder() {
        sum += (*last as u32) << 8;
    }

    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }

    !sum as u16
}
