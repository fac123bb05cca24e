//! Network interface enumeration backed by the operating system

use std::fs;
use std::path::Path;

use linkscout_core::{Error, LinkEnumerator, LinkHandle, MacAddr, Result};
use pnet_datalink::{self, NetworkInterface};
use tracing::trace;

/// Default sysfs root for link attributes on Linux
const SYSFS_NET: &str = "/sys/class/net";

/// Enumerates links with pnet and reads negotiated speed from sysfs
///
/// Speed is only available on Linux; elsewhere, and for links that report
/// no speed (virtual, down), it stays unknown.
#[derive(Debug, Clone, Default)]
pub struct SystemLinks;

impl SystemLinks {
    pub fn new() -> Self {
        Self
    }

    fn handle_for(&self, iface: &NetworkInterface) -> LinkHandle {
        let mac = iface
            .mac
            .map(|mac| MacAddr::new([mac.0, mac.1, mac.2, mac.3, mac.4, mac.5]));
        LinkHandle {
            name: iface.name.clone(),
            mac,
            is_up: iface.is_up(),
            is_loopback: iface.is_loopback(),
            speed_mbps: read_speed(Path::new(SYSFS_NET), &iface.name),
        }
    }
}

impl LinkEnumerator for SystemLinks {
    fn links(&self) -> Result<Vec<LinkHandle>> {
        let interfaces = pnet_datalink::interfaces();

        if interfaces.is_empty() {
            return Err(Error::Capture(
                "No network interfaces found. Are you running with sufficient privileges?"
                    .to_string(),
            ));
        }

        Ok(interfaces.iter().map(|iface| self.handle_for(iface)).collect())
    }

    fn link(&self, name: &str) -> Result<LinkHandle> {
        pnet_datalink::interfaces()
            .iter()
            .find(|iface| iface.name == name)
            .map(|iface| self.handle_for(iface))
            .ok_or_else(|| Error::InterfaceNotFound(name.to_string()))
    }
}

/// Negotiated speed in Mbps from `<root>/<name>/speed`
///
/// The kernel reports -1 (or fails the read) when the speed is unknown.
pub(crate) fn read_speed(root: &Path, name: &str) -> Option<u32> {
    let path = root.join(name).join("speed");
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) => {
            trace!(interface = name, error = %e, "link speed unavailable");
            return None;
        }
    };

    match raw.trim().parse::<i64>() {
        Ok(mbps) if mbps > 0 => u32::try_from(mbps).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sysfs_with(entries: &[(&str, &str)]) -> TempDir {
        let root = TempDir::new().unwrap();
        for (name, speed) in entries {
            let dir = root.path().join(name);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("speed"), speed).unwrap();
        }
        root
    }

    #[test]
    fn test_read_speed() {
        let root = sysfs_with(&[("eth0", "1000\n"), ("eth1", "-1\n"), ("eth2", "garbage")]);
        assert_eq!(read_speed(root.path(), "eth0"), Some(1000));
        assert_eq!(read_speed(root.path(), "eth1"), None);
        assert_eq!(read_speed(root.path(), "eth2"), None);
        assert_eq!(read_speed(root.path(), "missing0"), None);
    }

    #[test]
    fn test_list_links() {
        // Should at least have loopback
        let links = SystemLinks::new().links().unwrap();
        assert!(!links.is_empty());
        for link in links.iter().filter(|l| l.is_loopback) {
            assert!(!link.is_capture_capable());
        }
    }

    #[test]
    fn test_get_nonexistent_link() {
        match SystemLinks::new().link("nonexistent_interface_xyz") {
            Err(Error::InterfaceNotFound(name)) => assert_eq!(name, "nonexistent_interface_xyz"),
            other => panic!("Expected InterfaceNotFound error, got {:?}", other),
        }
        assert_eq!(SystemLinks::new().speed_of("nonexistent_interface_xyz"), "Unknown");
    }
}
