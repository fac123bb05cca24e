//! One capture session bound to a single interface

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use linkscout_core::{Error, RawFrame, Result};
use linkscout_protocols::{decode_frame, NeighborKey, NeighborRecord};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, trace, warn};

use crate::filters;
use crate::source::FrameSource;
use crate::stats::{CaptureStats, StatsAccumulator};

/// Default bound on how long `stop()` waits for the loop to exit
const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Invoked on the capture thread for every decoded neighbor
pub type NeighborCallback = Arc<dyn Fn(&NeighborRecord) + Send + Sync>;

/// Invoked once when the capture primitive fails
pub type ErrorCallback = Arc<dyn Fn(&Error) + Send + Sync>;

/// Lifecycle of a [`LinkCapture`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No capture loop is running
    Idle,
    /// The capture loop is delivering frames
    Running,
    /// Cancellation was requested and `stop()` is waiting for the loop
    Stopping,
}

/// How a call to [`LinkCapture::stop`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The capture was not running
    NotRunning,
    /// The loop observed the cancellation flag and exited
    Stopped,
    /// The loop did not exit within the stop timeout and was left behind
    Abandoned,
}

/// Per-link capture settings
#[derive(Debug, Clone)]
pub struct LinkCaptureConfig {
    /// Upper bound on how long `stop()` blocks
    pub stop_timeout: Duration,
    /// BPF expression handed to the capture primitive
    pub filter: String,
}

impl Default for LinkCaptureConfig {
    fn default() -> Self {
        Self {
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            filter: filters::discovery_filter(),
        }
    }
}

/// Cancellation handle of the current run
///
/// Each run gets a fresh flag so a loop abandoned by an earlier `stop()`
/// never observes a later `start()`.
struct RunControl {
    stop_flag: Arc<AtomicBool>,
    done: Option<Receiver<()>>,
}

/// Captures discovery frames on one interface and keeps its neighbor table
pub struct LinkCapture {
    interface: String,
    config: LinkCaptureConfig,
    source: Arc<dyn FrameSource>,
    state: Arc<RwLock<CaptureState>>,
    control: Mutex<RunControl>,
    neighbors: Arc<RwLock<HashMap<NeighborKey, NeighborRecord>>>,
    on_neighbor: Option<NeighborCallback>,
    on_error: Option<ErrorCallback>,
    last_error: Arc<Mutex<Option<String>>>,
    stats: StatsAccumulator,
}

impl LinkCapture {
    /// Create an idle capture with the default configuration
    pub fn new<S: Into<String>>(interface: S, source: Arc<dyn FrameSource>) -> Self {
        Self::with_config(interface, source, LinkCaptureConfig::default())
    }

    /// Create an idle capture with a custom configuration
    pub fn with_config<S: Into<String>>(
        interface: S,
        source: Arc<dyn FrameSource>,
        config: LinkCaptureConfig,
    ) -> Self {
        Self {
            interface: interface.into(),
            config,
            source,
            state: Arc::new(RwLock::new(CaptureState::Idle)),
            control: Mutex::new(RunControl {
                stop_flag: Arc::new(AtomicBool::new(false)),
                done: None,
            }),
            neighbors: Arc::new(RwLock::new(HashMap::new())),
            on_neighbor: None,
            on_error: None,
            last_error: Arc::new(Mutex::new(None)),
            stats: StatsAccumulator::new(),
        }
    }

    /// Register the callback fired for every decoded neighbor
    pub fn with_neighbor_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&NeighborRecord) + Send + Sync + 'static,
    {
        self.on_neighbor = Some(Arc::new(callback));
        self
    }

    /// Register the callback fired when the capture primitive fails
    pub fn with_error_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn config(&self) -> &LinkCaptureConfig {
        &self.config
    }

    /// Start the capture loop on its own thread
    ///
    /// Calling `start` while the loop is running does nothing.
    pub fn start(&self) -> Result<()> {
        let mut control = self.control.lock();

        {
            let mut state = self.state.write();
            if *state != CaptureState::Idle {
                debug!(interface = %self.interface, "capture already running");
                return Ok(());
            }
            *state = CaptureState::Running;
        }

        self.stats.reset();
        let stop_flag = Arc::new(AtomicBool::new(false));
        let (done_tx, done_rx) = mpsc::channel();

        let run = CaptureRun {
            interface: self.interface.clone(),
            filter: self.config.filter.clone(),
            source: Arc::clone(&self.source),
            state: Arc::clone(&self.state),
            stop_flag: Arc::clone(&stop_flag),
            neighbors: Arc::clone(&self.neighbors),
            on_neighbor: self.on_neighbor.clone(),
            on_error: self.on_error.clone(),
            last_error: Arc::clone(&self.last_error),
            stats: self.stats.clone(),
        };

        let spawned = thread::Builder::new()
            .name(format!("linkscout-{}", self.interface))
            .spawn(move || {
                run.run();
                let _ = done_tx.send(());
            });

        if let Err(e) = spawned {
            *self.state.write() = CaptureState::Idle;
            error!(interface = %self.interface, error = %e, "failed to spawn capture thread");
            return Err(e.into());
        }

        control.stop_flag = stop_flag;
        control.done = Some(done_rx);
        info!(interface = %self.interface, "started discovery capture");
        Ok(())
    }

    /// Request cancellation and wait up to the stop timeout for the loop
    ///
    /// The state is Idle when this returns, whether or not the loop exited.
    pub fn stop(&self) -> StopOutcome {
        let mut control = self.control.lock();

        {
            let mut state = self.state.write();
            if *state != CaptureState::Running {
                return StopOutcome::NotRunning;
            }
            *state = CaptureState::Stopping;
            control.stop_flag.store(true, Ordering::SeqCst);
        }

        let outcome = match control.done.take() {
            Some(done) => match done.recv_timeout(self.config.stop_timeout) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => StopOutcome::Stopped,
                Err(RecvTimeoutError::Timeout) => StopOutcome::Abandoned,
            },
            None => StopOutcome::Stopped,
        };

        *self.state.write() = CaptureState::Idle;

        match outcome {
            StopOutcome::Abandoned => warn!(
                interface = %self.interface,
                timeout_ms = self.config.stop_timeout.as_millis() as u64,
                "capture loop did not exit in time, abandoning it"
            ),
            _ => info!(interface = %self.interface, "stopped discovery capture"),
        }
        outcome
    }

    pub fn state(&self) -> CaptureState {
        *self.state.read()
    }

    /// True while the loop is running or being stopped
    pub fn is_running(&self) -> bool {
        self.state() != CaptureState::Idle
    }

    /// Snapshot of the neighbors seen on this link
    pub fn get_neighbors(&self) -> Vec<NeighborRecord> {
        let mut neighbors: Vec<_> = self.neighbors.read().values().cloned().collect();
        neighbors.sort_by(|a, b| a.key().cmp(&b.key()));
        neighbors
    }

    pub fn clear_neighbors(&self) {
        self.neighbors.write().clear();
    }

    pub fn stats(&self) -> CaptureStats {
        self.stats.snapshot()
    }

    /// Message of the last capture-primitive failure, if any
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }
}

impl Drop for LinkCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Everything the capture thread owns for one run
struct CaptureRun {
    interface: String,
    filter: String,
    source: Arc<dyn FrameSource>,
    state: Arc<RwLock<CaptureState>>,
    stop_flag: Arc<AtomicBool>,
    neighbors: Arc<RwLock<HashMap<NeighborKey, NeighborRecord>>>,
    on_neighbor: Option<NeighborCallback>,
    on_error: Option<ErrorCallback>,
    last_error: Arc<Mutex<Option<String>>>,
    stats: StatsAccumulator,
}

impl CaptureRun {
    fn run(&self) {
        let stop_flag = Arc::clone(&self.stop_flag);
        let should_stop = move || stop_flag.load(Ordering::SeqCst);

        let result = self.source.sniff(
            &self.interface,
            &self.filter,
            &mut |frame| self.handle_frame(frame),
            &should_stop,
        );

        // Back to Idle before the outcome is reported
        let cancelled = {
            let mut state = self.state.write();
            let cancelled = self.stop_flag.load(Ordering::SeqCst);
            if !cancelled {
                *state = CaptureState::Idle;
            }
            cancelled
        };

        match result {
            Ok(()) if cancelled => debug!(interface = %self.interface, "capture loop cancelled"),
            Ok(()) => info!(interface = %self.interface, "capture source exhausted"),
            Err(e) if cancelled => {
                debug!(interface = %self.interface, error = %e, "capture ended with error after stop")
            }
            Err(e) => self.report_failure(&e),
        }
    }

    fn report_failure(&self, e: &Error) {
        error!(interface = %self.interface, error = %e, "capture failed");
        *self.last_error.lock() = Some(e.to_string());
        if let Some(callback) = &self.on_error {
            callback(e);
        }
    }

    fn handle_frame(&self, frame: RawFrame) {
        if self.stop_flag.load(Ordering::SeqCst) {
            return;
        }
        self.stats.record_frame(frame.len());

        let decoded = panic::catch_unwind(AssertUnwindSafe(|| self.store(&frame)));
        let neighbor = match decoded {
            Ok(Ok(neighbor)) => neighbor,
            Ok(Err(e)) => {
                self.stats.record_dropped();
                trace!(interface = %self.interface, error = %e, "dropped frame");
                return;
            }
            Err(_) => {
                self.stats.record_dropped();
                warn!(
                    interface = %self.interface,
                    len = frame.len(),
                    "decoder panicked, frame discarded"
                );
                return;
            }
        };
        self.stats.record_decoded();

        if let Some(callback) = &self.on_neighbor {
            if panic::catch_unwind(AssertUnwindSafe(|| callback(&neighbor))).is_err() {
                self.stats.record_callback_panic();
                warn!(
                    interface = %self.interface,
                    device_id = %neighbor.device_id,
                    "neighbor callback panicked"
                );
            }
        }
    }

    /// Decode a frame and record the neighbor in the local table
    fn store(&self, frame: &RawFrame) -> Result<NeighborRecord> {
        let neighbor = decode_frame(frame, &self.interface)?;
        debug!(
            interface = %self.interface,
            protocol = %neighbor.protocol(),
            device_id = %neighbor.device_id,
            port_id = %neighbor.port_id,
            "neighbor observed"
        );

        self.neighbors
            .write()
            .insert(neighbor.key(), neighbor.clone());
        Ok(neighbor)
    }
}
