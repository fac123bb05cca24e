//! Console rendering of neighbors

use chrono::{DateTime, Local};
use linkscout_capture::CaptureStats;
use linkscout_protocols::{NeighborRecord, ProtocolDetails};

/// Wall-clock rendering of an observation time
pub fn format_seen(neighbor: &NeighborRecord) -> String {
    let seen: DateTime<Local> = neighbor.last_seen.into();
    seen.format("%H:%M:%S").to_string()
}

/// One line per observation, printed as frames arrive
pub fn format_event(neighbor: &NeighborRecord) -> String {
    format!(
        "[{}] {} {} -> {} port {} ({})",
        format_seen(neighbor),
        neighbor.protocol(),
        neighbor.local_interface,
        neighbor.device_id,
        neighbor.port_id,
        neighbor.display_ip().unwrap_or_else(|| "no address".to_string())
    )
}

/// Multi-line description of a neighbor for the final summary
pub fn format_neighbor(neighbor: &NeighborRecord) -> String {
    let mut lines = vec![format!(
        "{} neighbor {} on {}",
        neighbor.protocol(),
        neighbor.device_id,
        neighbor.local_interface
    )];

    let mut field = |name: &str, value: String| lines.push(format!("  {:<14} {}", name, value));

    field("Port:", neighbor.port_id.clone());
    if let Some(speed) = &neighbor.local_port_speed {
        field("Local speed:", speed.clone());
    }
    if let Some(platform) = &neighbor.platform {
        field("Platform:", platform.clone());
    }
    let addresses = neighbor.all_addresses();
    if !addresses.is_empty() {
        field("Addresses:", addresses.join(", "));
    }
    if !neighbor.capabilities.is_empty() {
        field("Capabilities:", neighbor.capabilities.join(", "));
    }
    if let Some(vlan) = neighbor.native_vlan {
        field("Native VLAN:", vlan.to_string());
    }

    match &neighbor.details {
        ProtocolDetails::Cdp {
            voice_vlan,
            duplex,
            vtp_domain,
            ..
        } => {
            if let Some(vlan) = voice_vlan {
                field("Voice VLAN:", vlan.to_string());
            }
            if let Some(duplex) = duplex {
                field("Duplex:", duplex.to_string());
            }
            if let Some(domain) = vtp_domain {
                field("VTP domain:", domain.clone());
            }
        }
        ProtocolDetails::Lldp {
            port_description,
            vlan_name,
            ..
        } => {
            if let Some(desc) = port_description {
                field("Port desc:", desc.clone());
            }
            if let Some(name) = vlan_name {
                field("VLAN name:", name.clone());
            }
        }
    }

    if let Some(mac) = neighbor.source_mac {
        field("Source MAC:", mac.to_string());
    }
    field("TTL:", format!("{}s", neighbor.ttl));
    field("Last seen:", format_seen(neighbor));

    lines.join("\n")
}

/// Capture counters of one interface for the shutdown summary
pub fn format_link_stats(interface: &str, stats: &CaptureStats) -> String {
    format!("{}: {}", interface, stats.format())
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkscout_core::{MacAddr, RawFrame};
    use linkscout_protocols::cdp::{CdpPdu, CdpTlv};
    use linkscout_protocols::decode_frame;
    use std::net::Ipv4Addr;
    use std::time::Duration;

    fn cdp_neighbor() -> NeighborRecord {
        let data = CdpPdu::new()
            .add_tlv(CdpTlv::DeviceId("core-sw1".to_string()))
            .add_tlv(CdpTlv::PortId("Gi1/0/24".to_string()))
            .add_tlv(CdpTlv::Addresses(vec![Ipv4Addr::new(10, 0, 0, 1)]))
            .add_tlv(CdpTlv::NativeVlan(20))
            .to_frame(MacAddr([0x00, 0x1b, 0x54, 0x00, 0x00, 0x01]));
        decode_frame(&RawFrame::new(data), "eth0")
            .unwrap()
            .with_local_port_speed("1G")
    }

    #[test]
    fn test_format_event() {
        let line = format_event(&cdp_neighbor());
        assert!(line.ends_with("CDP eth0 -> core-sw1 port Gi1/0/24 (10.0.0.1)"));
    }

    #[test]
    fn test_format_neighbor() {
        let text = format_neighbor(&cdp_neighbor());
        assert!(text.starts_with("CDP neighbor core-sw1 on eth0"));
        assert!(text.contains("Local speed:   1G"));
        assert!(text.contains("Addresses:     10.0.0.1"));
        assert!(text.contains("Native VLAN:   20"));
        assert!(text.contains("Source MAC:    00:1b:54:00:00:01"));
        assert!(!text.contains("Voice VLAN"));
    }

    #[test]
    fn test_format_link_stats() {
        let stats = CaptureStats {
            frames_received: 4,
            frames_decoded: 3,
            frames_dropped: 1,
            bytes_received: 1024,
            duration: Duration::from_secs(30),
            ..Default::default()
        };
        assert_eq!(
            format_link_stats("eth0", &stats),
            "eth0: Received: 4 frames (1024 bytes), decoded: 3, dropped: 1 (25.0%) in 30.0s"
        );
    }
}
