//! Local link descriptions and the link-enumeration seam

use std::fmt;

use crate::{Error, MacAddr, Result};

/// A local network link as reported by the operating system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkHandle {
    /// Interface name (e.g., "eth0", "en0")
    pub name: String,
    /// MAC address, if the link has one
    pub mac: Option<MacAddr>,
    /// Is interface up?
    pub is_up: bool,
    /// Is interface a loopback?
    pub is_loopback: bool,
    /// Negotiated speed in Mbps (None or 0 when unknown)
    pub speed_mbps: Option<u32>,
}

impl LinkHandle {
    /// Create an up, non-loopback link with unknown speed
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            mac: None,
            is_up: true,
            is_loopback: false,
            speed_mbps: None,
        }
    }

    /// Set the link speed in Mbps
    pub fn with_speed(mut self, speed_mbps: u32) -> Self {
        self.speed_mbps = Some(speed_mbps);
        self
    }

    /// Check if the interface is suitable for packet capture
    pub fn is_capture_capable(&self) -> bool {
        self.is_up && !self.is_loopback
    }

    /// Human-readable speed: "10G", "100M", or "Unknown"
    pub fn speed_display(&self) -> String {
        match self.speed_mbps {
            None | Some(0) => "Unknown".to_string(),
            Some(mbps) if mbps >= 1000 => format!("{}G", mbps / 1000),
            Some(mbps) => format!("{}M", mbps),
        }
    }
}

impl fmt::Display for LinkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(mac) = self.mac {
            write!(f, " ({})", mac)?;
        }
        write!(
            f,
            " [{}{}] {}",
            if self.is_up { "UP" } else { "DOWN" },
            if self.is_loopback { ", loopback" } else { "" },
            self.speed_display()
        )
    }
}

/// Source of local link information
///
/// Consulted by the capture coordinator for link speed; never owns the links.
pub trait LinkEnumerator: Send + Sync {
    /// All links known to the system
    fn links(&self) -> Result<Vec<LinkHandle>>;

    /// Look up a single link by name
    fn link(&self, name: &str) -> Result<LinkHandle> {
        self.links()?
            .into_iter()
            .find(|link| link.name == name)
            .ok_or_else(|| Error::InterfaceNotFound(name.to_string()))
    }

    /// Links that are up and not loopback
    fn capture_links(&self) -> Result<Vec<LinkHandle>> {
        Ok(self
            .links()?
            .into_iter()
            .filter(LinkHandle::is_capture_capable)
            .collect())
    }

    /// Display speed of a link, "Unknown" when it cannot be determined
    fn speed_of(&self, name: &str) -> String {
        self.link(name)
            .map(|link| link.speed_display())
            .unwrap_or_else(|_| "Unknown".to_string())
    }
}

/// Fixed link table, handy when the link set is known up front
#[derive(Debug, Clone, Default)]
pub struct StaticLinks {
    links: Vec<LinkHandle>,
}

impl StaticLinks {
    pub fn new(links: Vec<LinkHandle>) -> Self {
        Self { links }
    }
}

impl LinkEnumerator for StaticLinks {
    fn links(&self) -> Result<Vec<LinkHandle>> {
        Ok(self.links.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_display() {
        assert_eq!(LinkHandle::new("eth0").speed_display(), "Unknown");
        assert_eq!(LinkHandle::new("eth0").with_speed(0).speed_display(), "Unknown");
        assert_eq!(LinkHandle::new("eth0").with_speed(100).speed_display(), "100M");
        assert_eq!(LinkHandle::new("eth0").with_speed(1000).speed_display(), "1G");
        assert_eq!(LinkHandle::new("eth0").with_speed(25000).speed_display(), "25G");
    }

    #[test]
    fn test_capture_links_filters_loopback_and_down() {
        let mut lo = LinkHandle::new("lo");
        lo.is_loopback = true;
        let mut down = LinkHandle::new("eth1");
        down.is_up = false;
        let links = StaticLinks::new(vec![lo, down, LinkHandle::new("eth0")]);

        let capture: Vec<_> = links
            .capture_links()
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(capture, vec!["eth0".to_string()]);
    }

    #[test]
    fn test_speed_of_unknown_link() {
        let links = StaticLinks::new(vec![LinkHandle::new("eth0").with_speed(10000)]);
        assert_eq!(links.speed_of("eth0"), "10G");
        assert_eq!(links.speed_of("eth7"), "Unknown");
        assert!(matches!(
            links.link("eth7"),
            Err(Error::InterfaceNotFound(name)) if name == "eth7"
        ));
    }
}
