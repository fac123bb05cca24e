//! In-process frame source and fixtures for capture tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use linkscout_core::{Error, MacAddr, RawFrame, Result};
use linkscout_protocols::cdp::{CdpPdu, CdpTlv};
use linkscout_protocols::lldp::{LldpPdu, LldpTlv};

use crate::source::FrameSource;

const NEIGHBOR_MAC: MacAddr = MacAddr([0x00, 0x1b, 0x54, 0xaa, 0xbb, 0xcc]);

/// CDP frame advertising `device_id` on `port_id`
pub(crate) fn cdp_frame(device_id: &str, port_id: &str) -> Vec<u8> {
    CdpPdu::new()
        .add_tlv(CdpTlv::DeviceId(device_id.to_string()))
        .add_tlv(CdpTlv::PortId(port_id.to_string()))
        .add_tlv(CdpTlv::Platform("cisco WS-C3850-24T".to_string()))
        .to_frame(NEIGHBOR_MAC)
}

/// LLDP frame advertising `system_name` on `port_id`
pub(crate) fn lldp_frame(system_name: &str, port_id: &str) -> Vec<u8> {
    LldpPdu::new_basic(NEIGHBOR_MAC, port_id, 120)
        .add_tlv(LldpTlv::system_name(system_name))
        .to_frame(NEIGHBOR_MAC)
}

/// Poll `cond` for up to two seconds
pub(crate) fn wait_until<F: Fn() -> bool>(cond: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

/// Replays a fixed list of frames, then behaves as configured
#[derive(Default)]
pub(crate) struct ScriptedSource {
    frames: Vec<Vec<u8>>,
    hold_open: bool,
    stall: Option<Duration>,
    fail_with: Option<String>,
    sniffs: AtomicUsize,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_frame(mut self, data: Vec<u8>) -> Self {
        self.frames.push(data);
        self
    }

    /// Keep polling for cancellation after the frames are delivered
    pub(crate) fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    /// Block without ever polling for cancellation
    pub(crate) fn stall_for(mut self, duration: Duration) -> Self {
        self.stall = Some(duration);
        self
    }

    /// Fail immediately as a denied pcap open would
    pub(crate) fn fail_with(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    pub(crate) fn sniff_count(&self) -> usize {
        self.sniffs.load(Ordering::SeqCst)
    }
}

impl FrameSource for ScriptedSource {
    fn sniff(
        &self,
        interface: &str,
        _filter: &str,
        on_frame: &mut dyn FnMut(RawFrame),
        should_stop: &dyn Fn() -> bool,
    ) -> Result<()> {
        self.sniffs.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.fail_with {
            return Err(Error::InsufficientPrivileges(format!(
                "cannot capture on '{}': {}",
                interface, message
            )));
        }

        for data in &self.frames {
            if should_stop() {
                return Ok(());
            }
            on_frame(RawFrame::new(data.clone()));
        }

        if let Some(stall) = self.stall {
            thread::sleep(stall);
            return Ok(());
        }

        while self.hold_open && !should_stop() {
            thread::sleep(Duration::from_millis(2));
        }
        Ok(())
    }
}
