//! BPF (Berkeley Packet Filter) filter builders for discovery traffic

use linkscout_core::{multicast, MacAddr};
use linkscout_protocols::ProtocolMode;

fn dst_mac_filter(mac: MacAddr) -> String {
    format!("ether dst {}", mac)
}

/// CDP filter
/// Matches the CDP multicast address without constraining the SNAP type,
/// so frames whose header needs the fallback scan are still delivered
pub fn cdp_filter() -> String {
    dst_mac_filter(multicast::CDP)
}

/// LLDP filter
/// Matches the LLDP EtherType or any of the three LLDP group addresses
pub fn lldp_filter() -> String {
    let [nearest, non_tpmr, customer] = multicast::LLDP_ALL.map(dst_mac_filter);
    combine_filters_or(&["ether proto 0x88cc", &nearest, &non_tpmr, &customer])
}

/// Everything either decoder can use
pub fn discovery_filter() -> String {
    let [nearest, non_tpmr, customer] = multicast::LLDP_ALL.map(dst_mac_filter);
    combine_filters_or(&[
        &cdp_filter(),
        "ether proto 0x88cc",
        &nearest,
        &non_tpmr,
        &customer,
    ])
}

/// Capture filter for a display mode
pub fn filter_for_mode(mode: ProtocolMode) -> String {
    match mode {
        ProtocolMode::Cdp => cdp_filter(),
        ProtocolMode::Lldp => lldp_filter(),
        ProtocolMode::Auto | ProtocolMode::Both => discovery_filter(),
    }
}

/// Combine multiple filters with OR logic
pub fn combine_filters_or(filters: &[&str]) -> String {
    if filters.is_empty() {
        return String::new();
    }

    filters
        .iter()
        .map(|f| format!("({})", f))
        .collect::<Vec<_>>()
        .join(" or ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdp_filter() {
        assert_eq!(cdp_filter(), "ether dst 01:00:0c:cc:cc:cc");
    }

    #[test]
    fn test_discovery_filter() {
        assert_eq!(
            discovery_filter(),
            "(ether dst 01:00:0c:cc:cc:cc) or (ether proto 0x88cc) or \
             (ether dst 01:80:c2:00:00:0e) or (ether dst 01:80:c2:00:00:03) or \
             (ether dst 01:80:c2:00:00:00)"
        );
    }

    #[test]
    fn test_lldp_filter() {
        let filter = lldp_filter();
        assert!(filter.starts_with("(ether proto 0x88cc)"));
        assert!(filter.contains("01:80:c2:00:00:03"));
        assert!(!filter.contains("01:00:0c:cc:cc:cc"));
    }

    #[test]
    fn test_filter_for_mode() {
        assert_eq!(filter_for_mode(ProtocolMode::Cdp), cdp_filter());
        assert_eq!(filter_for_mode(ProtocolMode::Lldp), lldp_filter());
        assert_eq!(filter_for_mode(ProtocolMode::Auto), discovery_filter());
        assert_eq!(filter_for_mode(ProtocolMode::Both), discovery_filter());
    }

    #[test]
    fn test_combine_filters_or() {
        assert_eq!(combine_filters_or(&["a", "b"]), "(a) or (b)");
        assert_eq!(combine_filters_or(&[]), "");
    }
}
