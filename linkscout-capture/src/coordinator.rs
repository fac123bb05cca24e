//! Multi-interface capture coordination
//!
//! The coordinator owns one [`LinkCapture`] per interface, merges their
//! neighbors into one table keyed by [`NeighborKey`], stamps each record
//! with the local link speed and forwards it to the consumer.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use linkscout_core::{Error, LinkEnumerator, Result};
use linkscout_protocols::{NeighborKey, NeighborRecord};
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::link_capture::{LinkCapture, LinkCaptureConfig, NeighborCallback, StopOutcome};
use crate::source::FrameSource;

/// Something the consumer learns from the coordinator
#[derive(Debug, Clone)]
pub enum DiscoveryEvent {
    /// A neighbor was observed (new or refreshed)
    Neighbor(NeighborRecord),
    /// An interface's capture failed and has stopped
    CaptureFailed { interface: String, error: String },
}

/// State reachable from the capture threads
struct Shared {
    neighbors: DashMap<NeighborKey, NeighborRecord>,
    links: Arc<dyn LinkEnumerator>,
    on_neighbor: RwLock<Option<NeighborCallback>>,
    subscribers: Mutex<Vec<UnboundedSender<DiscoveryEvent>>>,
}

impl Shared {
    fn neighbor_discovered(&self, neighbor: &NeighborRecord) {
        let speed = self.links.speed_of(&neighbor.local_interface);
        let neighbor = neighbor.clone().with_local_port_speed(speed);

        let key = neighbor.key();
        let refreshed = self.neighbors.insert(key.clone(), neighbor.clone()).is_some();
        debug!(%key, refreshed, "neighbor table updated");

        let callback = self.on_neighbor.read().clone();
        if let Some(callback) = callback {
            callback(&neighbor);
        }
        self.publish(DiscoveryEvent::Neighbor(neighbor));
    }

    fn capture_failed(&self, interface: &str, error: &Error) {
        warn!(interface, error = %error, "capture stopped after failure");
        self.publish(DiscoveryEvent::CaptureFailed {
            interface: interface.to_string(),
            error: error.to_string(),
        });
    }

    fn publish(&self, event: DiscoveryEvent) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Runs discovery capture on a set of interfaces
pub struct CaptureCoordinator {
    source: Arc<dyn FrameSource>,
    config: LinkCaptureConfig,
    captures: RwLock<HashMap<String, Arc<LinkCapture>>>,
    shared: Arc<Shared>,
}

impl CaptureCoordinator {
    /// Create a coordinator with the default per-link configuration
    pub fn new(source: Arc<dyn FrameSource>, links: Arc<dyn LinkEnumerator>) -> Self {
        Self::with_config(source, links, LinkCaptureConfig::default())
    }

    /// Create a coordinator whose links all use `config`
    pub fn with_config(
        source: Arc<dyn FrameSource>,
        links: Arc<dyn LinkEnumerator>,
        config: LinkCaptureConfig,
    ) -> Self {
        Self {
            source,
            config,
            captures: RwLock::new(HashMap::new()),
            shared: Arc::new(Shared {
                neighbors: DashMap::new(),
                links,
                on_neighbor: RwLock::new(None),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Register the consumer callback, replacing any previous one
    ///
    /// The callback runs on the capture thread that observed the neighbor.
    pub fn on_neighbor<F>(&self, callback: F)
    where
        F: Fn(&NeighborRecord) + Send + Sync + 'static,
    {
        *self.shared.on_neighbor.write() = Some(Arc::new(callback));
    }

    /// Receive every neighbor update and capture failure from now on
    pub fn subscribe(&self) -> UnboundedReceiver<DiscoveryEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.shared.subscribers.lock().push(tx);
        rx
    }

    /// Manage a new interface; its capture starts with `start_all` or
    /// `start_interface`
    pub fn add_interface(&self, interface: &str) -> Result<()> {
        let mut captures = self.captures.write();
        if captures.contains_key(interface) {
            return Err(Error::AlreadyExists(format!("interface '{}'", interface)));
        }

        let on_neighbor = Arc::clone(&self.shared);
        let on_error = Arc::clone(&self.shared);
        let name = interface.to_string();
        let capture = LinkCapture::with_config(interface, Arc::clone(&self.source), self.config.clone())
            .with_neighbor_callback(move |neighbor| on_neighbor.neighbor_discovered(neighbor))
            .with_error_callback(move |error| on_error.capture_failed(&name, error));

        captures.insert(interface.to_string(), Arc::new(capture));
        info!(interface, "interface added");
        Ok(())
    }

    /// Stop and forget an interface; its neighbors stay in the table
    pub fn remove_interface(&self, interface: &str) -> Result<()> {
        let capture = self
            .captures
            .write()
            .remove(interface)
            .ok_or_else(|| Error::NotFound(format!("interface '{}'", interface)))?;
        capture.stop();
        info!(interface, "interface removed");
        Ok(())
    }

    /// Names of the managed interfaces, sorted
    pub fn interfaces(&self) -> Vec<String> {
        let mut names: Vec<_> = self.captures.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Start every managed capture
    ///
    /// A link that fails to start does not prevent the others; the first
    /// error is returned after all links were tried.
    pub fn start_all(&self) -> Result<()> {
        let mut first_error = None;
        for capture in self.snapshot() {
            if let Err(e) = capture.start() {
                warn!(interface = capture.interface(), error = %e, "failed to start capture");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Stop every managed capture, each bounded by the stop timeout
    pub fn stop_all(&self) {
        for capture in self.snapshot() {
            if capture.stop() == StopOutcome::Abandoned {
                warn!(interface = capture.interface(), "capture abandoned during stop");
            }
        }
    }

    pub fn start_interface(&self, interface: &str) -> Result<()> {
        self.capture(interface)?.start()
    }

    pub fn stop_interface(&self, interface: &str) -> Result<StopOutcome> {
        Ok(self.capture(interface)?.stop())
    }

    /// True if any managed capture is active
    pub fn is_running(&self) -> bool {
        self.captures.read().values().any(|c| c.is_running())
    }

    /// True if `interface` is managed and its capture is active
    pub fn is_interface_running(&self, interface: &str) -> bool {
        self.captures
            .read()
            .get(interface)
            .is_some_and(|c| c.is_running())
    }

    /// Direct access to one interface's capture
    pub fn capture(&self, interface: &str) -> Result<Arc<LinkCapture>> {
        self.captures
            .read()
            .get(interface)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("interface '{}'", interface)))
    }

    /// Every neighbor seen on any interface, ordered by key
    pub fn get_all_neighbors(&self) -> Vec<NeighborRecord> {
        let mut neighbors: Vec<_> = self
            .shared
            .neighbors
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        neighbors.sort_by(|a, b| a.key().cmp(&b.key()));
        neighbors
    }

    pub fn neighbor_count(&self) -> usize {
        self.shared.neighbors.len()
    }

    /// Empty the aggregate table and every per-link table
    pub fn clear_all_neighbors(&self) {
        self.shared.neighbors.clear();
        for capture in self.snapshot() {
            capture.clear_neighbors();
        }
    }

    // Start and stop block, so they run outside the map lock.
    fn snapshot(&self) -> Vec<Arc<LinkCapture>> {
        self.captures.read().values().cloned().collect()
    }
}

impl Drop for CaptureCoordinator {
    fn drop(&mut self) {
        self.stop_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{cdp_frame, lldp_frame, wait_until, ScriptedSource};
    use linkscout_core::{DiscoveryProtocol, LinkHandle, StaticLinks};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    fn links() -> Arc<dyn LinkEnumerator> {
        Arc::new(StaticLinks::new(vec![
            LinkHandle::new("eth0").with_speed(1000),
            LinkHandle::new("eth1").with_speed(100),
        ]))
    }

    fn quick_config() -> LinkCaptureConfig {
        LinkCaptureConfig {
            stop_timeout: Duration::from_millis(200),
            ..Default::default()
        }
    }

    fn coordinator(source: ScriptedSource) -> CaptureCoordinator {
        CaptureCoordinator::with_config(Arc::new(source), links(), quick_config())
    }

    #[test]
    fn test_add_and_remove_interface() {
        let coord = coordinator(ScriptedSource::new().hold_open());
        coord.add_interface("eth0").unwrap();
        assert!(matches!(
            coord.add_interface("eth0"),
            Err(Error::AlreadyExists(_))
        ));
        assert!(!coord.is_interface_running("eth0"));

        coord.start_all().unwrap();
        assert!(coord.is_interface_running("eth0"));

        coord.remove_interface("eth0").unwrap();
        assert!(!coord.is_running());
        assert!(coord.interfaces().is_empty());
        assert!(matches!(
            coord.remove_interface("eth0"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_neighbors_stamped_with_speed() {
        let source = ScriptedSource::new()
            .with_frame(cdp_frame("core-sw1", "Gi1/0/1"))
            .hold_open();
        let coord = coordinator(source);
        coord.add_interface("eth0").unwrap();
        coord.add_interface("eth1").unwrap();
        coord.add_interface("eth2").unwrap();
        coord.start_all().unwrap();

        assert!(wait_until(|| coord.neighbor_count() == 3));
        let neighbors = coord.get_all_neighbors();
        let speeds: Vec<_> = neighbors
            .iter()
            .map(|n| (n.local_interface.as_str(), n.local_port_speed.as_deref()))
            .collect();
        assert_eq!(
            speeds,
            vec![
                ("eth0", Some("1G")),
                ("eth1", Some("100M")),
                ("eth2", Some("Unknown")),
            ]
        );
        coord.stop_all();
    }

    #[test]
    fn test_same_key_overwrites() {
        let source = ScriptedSource::new()
            .with_frame(cdp_frame("core-sw1", "Gi1/0/1"))
            .with_frame(lldp_frame("core-sw1", "Gi1/0/1"))
            .with_frame(cdp_frame("core-sw1", "Gi1/0/1"))
            .hold_open();
        let coord = coordinator(source);
        let updates = Arc::new(AtomicUsize::new(0));
        let updates_cb = Arc::clone(&updates);
        coord.on_neighbor(move |_| {
            updates_cb.fetch_add(1, Ordering::SeqCst);
        });
        coord.add_interface("eth0").unwrap();
        coord.start_all().unwrap();

        assert!(wait_until(|| updates.load(Ordering::SeqCst) == 3));
        let neighbors = coord.get_all_neighbors();
        assert_eq!(neighbors.len(), 2);
        assert_eq!(neighbors[0].protocol(), DiscoveryProtocol::Cdp);
        assert_eq!(neighbors[1].protocol(), DiscoveryProtocol::Lldp);
        coord.stop_all();
    }

    #[test]
    fn test_clear_all_neighbors() {
        let source = ScriptedSource::new()
            .with_frame(cdp_frame("core-sw1", "Gi1/0/1"))
            .hold_open();
        let coord = coordinator(source);
        coord.add_interface("eth0").unwrap();
        coord.start_all().unwrap();
        assert!(wait_until(|| coord.neighbor_count() == 1));

        coord.clear_all_neighbors();
        assert!(coord.get_all_neighbors().is_empty());
        assert!(coord.capture("eth0").unwrap().get_neighbors().is_empty());
        coord.stop_all();
    }

    #[test]
    fn test_per_interface_control() {
        let coord = coordinator(ScriptedSource::new().hold_open());
        coord.add_interface("eth0").unwrap();
        coord.add_interface("eth1").unwrap();

        coord.start_interface("eth1").unwrap();
        assert!(coord.is_running());
        assert!(coord.is_interface_running("eth1"));
        assert!(!coord.is_interface_running("eth0"));
        assert!(!coord.is_interface_running("eth9"));
        assert!(matches!(
            coord.start_interface("eth9"),
            Err(Error::NotFound(_))
        ));

        assert_eq!(coord.stop_interface("eth1").unwrap(), StopOutcome::Stopped);
        assert!(!coord.is_running());
    }

    #[test]
    fn test_stop_all_is_bounded() {
        let coord = coordinator(ScriptedSource::new().stall_for(Duration::from_secs(2)));
        coord.add_interface("eth0").unwrap();
        coord.start_all().unwrap();

        let started = Instant::now();
        coord.stop_all();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!coord.is_running());
    }

    #[test]
    fn test_subscribe_receives_events() {
        let source = ScriptedSource::new()
            .with_frame(lldp_frame("edge-sw7", "ge-0/0/3"))
            .hold_open();
        let coord = coordinator(source);
        let mut events = coord.subscribe();
        coord.add_interface("eth0").unwrap();
        coord.start_all().unwrap();

        assert!(wait_until(|| coord.neighbor_count() == 1));
        coord.stop_all();

        match events.try_recv() {
            Ok(DiscoveryEvent::Neighbor(n)) => {
                assert_eq!(n.device_id, "edge-sw7");
                assert_eq!(n.local_port_speed.as_deref(), Some("1G"));
            }
            other => panic!("Expected neighbor event, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_event_follows_idle() {
        let coord = coordinator(ScriptedSource::new().fail_with("interface went away"));
        let mut events = coord.subscribe();
        coord.add_interface("eth0").unwrap();
        coord.start_all().unwrap();

        match events.blocking_recv() {
            Some(DiscoveryEvent::CaptureFailed { interface, .. }) => {
                assert_eq!(interface, "eth0");
                // A consumer reacting to the event sees nothing left running
                assert!(!coord.is_running());
            }
            other => panic!("Expected failure event, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_reported_once_and_isolated() {
        struct SplitSource {
            failing: ScriptedSource,
            healthy: ScriptedSource,
        }

        impl FrameSource for SplitSource {
            fn sniff(
                &self,
                interface: &str,
                filter: &str,
                on_frame: &mut dyn FnMut(linkscout_core::RawFrame),
                should_stop: &dyn Fn() -> bool,
            ) -> Result<()> {
                let source = if interface == "eth1" {
                    &self.failing
                } else {
                    &self.healthy
                };
                source.sniff(interface, filter, on_frame, should_stop)
            }
        }

        let source = SplitSource {
            failing: ScriptedSource::new().fail_with("permission denied"),
            healthy: ScriptedSource::new()
                .with_frame(cdp_frame("core-sw1", "Gi1/0/1"))
                .hold_open(),
        };
        let coord = CaptureCoordinator::with_config(Arc::new(source), links(), quick_config());
        let mut events = coord.subscribe();
        coord.add_interface("eth0").unwrap();
        coord.add_interface("eth1").unwrap();
        coord.start_all().unwrap();

        assert!(wait_until(|| !coord.is_interface_running("eth1")));
        assert!(wait_until(|| coord.neighbor_count() == 1));
        assert!(coord.is_interface_running("eth0"));
        coord.stop_all();

        let mut failures = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let DiscoveryEvent::CaptureFailed { interface, error } = event {
                failures.push((interface, error));
            }
        }
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "eth1");
        assert!(failures[0].1.contains("permission denied"));
        assert!(coord
            .capture("eth1")
            .unwrap()
            .last_error()
            .is_some());
    }
}
