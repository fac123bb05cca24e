//! Raw captured frames

use std::time::SystemTime;

/// Length of an untagged Ethernet header
pub const ETHERNET_HEADER_LEN: usize = 14;

/// A frame exactly as delivered by the capture primitive
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// When the frame was captured
    pub timestamp: SystemTime,
    /// Frame bytes, starting at the destination MAC
    data: Vec<u8>,
}

impl RawFrame {
    /// Create a frame stamped with the current time
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_timestamp(data, SystemTime::now())
    }

    /// Create a frame with an explicit capture time
    pub fn with_timestamp(data: Vec<u8>, timestamp: SystemTime) -> Self {
        Self { timestamp, data }
    }

    /// Get frame data as slice
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get frame length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if frame is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
