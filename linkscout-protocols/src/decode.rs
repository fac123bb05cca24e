//! Classify, decode and normalize a captured frame in one pass

use linkscout_core::{Error, RawFrame, Result};
use tracing::trace;

use crate::classify::{classify, FrameKind};
use crate::neighbor::NeighborRecord;
use crate::{cdp, lldp};

/// Turn a raw frame into a neighbor record
///
/// Returns [`Error::UnrecognizedFrame`] for frames that are not discovery
/// traffic or whose header cannot be located. Truncated TLVs do not fail
/// the call; the record carries whatever was decoded.
pub fn decode_frame(frame: &RawFrame, local_interface: &str) -> Result<NeighborRecord> {
    let data = frame.data();
    let kind = classify(data);
    trace!(interface = local_interface, ?kind, len = data.len(), "classified frame");

    match kind {
        FrameKind::Cdp => cdp::decode(data)
            .map(|record| NeighborRecord::from_cdp(record, local_interface, frame.timestamp))
            .ok_or_else(|| Error::UnrecognizedFrame("CDP header not found".to_string())),
        FrameKind::Lldp => lldp::decode(data)
            .map(|record| NeighborRecord::from_lldp(record, local_interface, frame.timestamp))
            .ok_or_else(|| Error::UnrecognizedFrame("LLDP EtherType mismatch".to_string())),
        FrameKind::Unknown => Err(Error::UnrecognizedFrame(format!(
            "not a discovery frame ({} bytes)",
            data.len()
        ))),
    }
}
