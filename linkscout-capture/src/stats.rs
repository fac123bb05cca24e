//! Per-link capture statistics

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Snapshot of one link's capture counters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureStats {
    /// Frames delivered by the capture primitive
    pub frames_received: u64,
    /// Frames that produced a neighbor record
    pub frames_decoded: u64,
    /// Frames discarded as unknown or undecodable
    pub frames_dropped: u64,
    /// Decoded frames whose neighbor callback panicked
    pub callback_panics: u64,
    /// Total bytes received
    pub bytes_received: u64,
    /// Time since the counters were last reset
    pub duration: Duration,
}

impl CaptureStats {
    /// Share of received frames that were discarded, as a percentage
    pub fn drop_rate(&self) -> f64 {
        if self.frames_received == 0 {
            return 0.0;
        }
        (self.frames_dropped as f64 / self.frames_received as f64) * 100.0
    }

    /// Format statistics as human-readable string
    pub fn format(&self) -> String {
        let mut line = format!(
            "Received: {} frames ({} bytes), decoded: {}, dropped: {} ({:.1}%) in {:.1}s",
            self.frames_received,
            self.bytes_received,
            self.frames_decoded,
            self.frames_dropped,
            self.drop_rate(),
            self.duration.as_secs_f64()
        );
        if self.callback_panics > 0 {
            line.push_str(&format!(", callback panics: {}", self.callback_panics));
        }
        line
    }
}

/// Thread-safe statistics accumulator for live capture
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    frames_received: Arc<AtomicU64>,
    frames_decoded: Arc<AtomicU64>,
    frames_dropped: Arc<AtomicU64>,
    callback_panics: Arc<AtomicU64>,
    bytes_received: Arc<AtomicU64>,
    start_time: Arc<Mutex<Instant>>,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self {
            frames_received: Arc::new(AtomicU64::new(0)),
            frames_decoded: Arc::new(AtomicU64::new(0)),
            frames_dropped: Arc::new(AtomicU64::new(0)),
            callback_panics: Arc::new(AtomicU64::new(0)),
            bytes_received: Arc::new(AtomicU64::new(0)),
            start_time: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Record a received frame
    pub fn record_frame(&self, size: usize) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(size as u64, Ordering::Relaxed);
    }

    /// Record a frame that produced a neighbor
    pub fn record_decoded(&self) {
        self.frames_decoded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a discarded frame
    pub fn record_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a neighbor callback that panicked
    pub fn record_callback_panic(&self) {
        self.callback_panics.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current statistics snapshot
    pub fn snapshot(&self) -> CaptureStats {
        CaptureStats {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            callback_panics: self.callback_panics.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            duration: self.start_time.lock().elapsed(),
        }
    }

    /// Reset all counters and restart the clock
    pub fn reset(&self) {
        self.frames_received.store(0, Ordering::Relaxed);
        self.frames_decoded.store(0, Ordering::Relaxed);
        self.frames_dropped.store(0, Ordering::Relaxed);
        self.callback_panics.store(0, Ordering::Relaxed);
        self.bytes_received.store(0, Ordering::Relaxed);
        *self.start_time.lock() = Instant::now();
    }
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
