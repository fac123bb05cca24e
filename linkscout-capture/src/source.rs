//! Capture primitive: the frame-source seam and its pcap implementation

use linkscout_core::{Error, RawFrame, Result};
use pcap::{Active, Capture, Device};
use tracing::{debug, info, warn};

/// Default snapshot length (maximum bytes per packet)
const DEFAULT_SNAPLEN: i32 = 65535;

/// Default read timeout (milliseconds); also bounds how long the loop goes
/// without checking for cancellation when the link is quiet
const DEFAULT_TIMEOUT_MS: i32 = 1000;

/// Configuration for packet capture
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Maximum bytes to capture per packet
    pub snaplen: i32,
    /// Read timeout in milliseconds
    pub timeout_ms: i32,
    /// Enable promiscuous mode
    pub promiscuous: bool,
    /// Buffer size (0 = default)
    pub buffer_size: i32,
    /// Enable immediate mode (deliver packets immediately)
    pub immediate_mode: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            snaplen: DEFAULT_SNAPLEN,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            promiscuous: true,
            buffer_size: 0,
            immediate_mode: true,
        }
    }
}

/// Something that can deliver raw frames from a named interface
///
/// `sniff` blocks, handing every frame that passes `filter` to `on_frame`,
/// until `should_stop` returns true or the primitive fails. Implementations
/// must poll `should_stop` at least once per frame and once per read
/// timeout.
pub trait FrameSource: Send + Sync {
    fn sniff(
        &self,
        interface: &str,
        filter: &str,
        on_frame: &mut dyn FnMut(RawFrame),
        should_stop: &dyn Fn() -> bool,
    ) -> Result<()>;
}

/// Live capture through libpcap
#[derive(Debug, Clone, Default)]
pub struct PcapSource {
    config: CaptureConfig,
}

impl PcapSource {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    fn open(&self, interface: &str, filter: &str) -> Result<Capture<Active>> {
        debug!(interface, "initializing pcap capture");

        let mut capture = Capture::from_device(Device::from(interface))
            .map_err(|e| map_pcap_error(interface, "create capture", e))?
            .promisc(self.config.promiscuous)
            .snaplen(self.config.snaplen)
            .timeout(self.config.timeout_ms)
            .immediate_mode(self.config.immediate_mode);

        if self.config.buffer_size > 0 {
            capture = capture.buffer_size(self.config.buffer_size);
        }

        let mut capture = capture
            .open()
            .map_err(|e| map_pcap_error(interface, "open capture", e))?;

        if !filter.is_empty() {
            capture
                .filter(filter, true)
                .map_err(|e| Error::Capture(format!("Failed to apply filter '{}': {}", filter, e)))?;
            debug!(interface, filter, "applied filter");
        }

        Ok(capture)
    }
}

impl FrameSource for PcapSource {
    fn sniff(
        &self,
        interface: &str,
        filter: &str,
        on_frame: &mut dyn FnMut(RawFrame),
        should_stop: &dyn Fn() -> bool,
    ) -> Result<()> {
        let mut capture = self.open(interface, filter)?;
        info!(interface, "capture started");

        while !should_stop() {
            match capture.next_packet() {
                Ok(packet) => on_frame(RawFrame::new(packet.data.to_vec())),
                Err(pcap::Error::TimeoutExpired) => continue,
                Err(e) => {
                    warn!(interface, error = %e, "packet capture error");
                    return Err(map_pcap_error(interface, "read packet", e));
                }
            }
        }

        info!(interface, "capture finished");
        Ok(())
    }
}

/// Classify a pcap failure; permission problems get their own variant
fn map_pcap_error(interface: &str, action: &str, e: pcap::Error) -> Error {
    let message = e.to_string();
    let lower = message.to_ascii_lowercase();
    if lower.contains("permission") || lower.contains("not permitted") {
        return Error::InsufficientPrivileges(format!(
            "cannot capture on '{}': {}",
            interface, message
        ));
    }
    if lower.contains("no such device") {
        return Error::InterfaceNotFound(interface.to_string());
    }
    Error::Capture(format!("Failed to {} on '{}': {}", action, interface, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_config_default() {
        let config = CaptureConfig::default();
        assert_eq!(config.snaplen, DEFAULT_SNAPLEN);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(config.promiscuous);
        assert!(config.immediate_mode);
        assert_eq!(config.buffer_size, 0);
    }

    #[test]
    fn test_map_pcap_error() {
        let denied = pcap::Error::PcapError(
            "eth0: You don't have permission to capture on that device".to_string(),
        );
        assert!(matches!(
            map_pcap_error("eth0", "open capture", denied),
            Error::InsufficientPrivileges(_)
        ));

        let missing = pcap::Error::PcapError("eth9: No such device exists".to_string());
        assert!(matches!(
            map_pcap_error("eth9", "open capture", missing),
            Error::InterfaceNotFound(name) if name == "eth9"
        ));

        let other = pcap::Error::PcapError("syntax error".to_string());
        assert!(matches!(
            map_pcap_error("eth0", "open capture", other),
            Error::Capture(_)
        ));
    }
}
