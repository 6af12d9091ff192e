// ── Snapshot dispatch ──
//
// Per-device consumers of poll results. The supervisor queries the
// registry on demand every cycle instead of caching the sink list, so
// devices added or removed between cycles are picked up immediately.

use std::sync::Arc;

use dashmap::DashMap;

use crate::model::{StatusSnapshot, TemperatureUnit};

/// A consumer of decoded status snapshots, one per managed device.
///
/// Each registered sink is called exactly once per successful slow-cadence
/// cycle with the full snapshot; it picks out its own device's record.
/// Calls arrive on the supervisor's polling task -- implementations should
/// hand off rather than block.
pub trait StatusSink: Send + Sync {
    fn on_poll(&self, snapshot: &StatusSnapshot, unit: TemperatureUnit);
}

/// The current set of dispatch targets, queried once per cycle.
pub trait SinkRegistry: Send + Sync {
    fn sinks(&self) -> Vec<Arc<dyn StatusSink>>;
}

/// Default registry: a concurrent map keyed by device name.
///
/// Hosts that already track their device set elsewhere can implement
/// [`SinkRegistry`] directly instead.
#[derive(Default)]
pub struct SinkSet {
    sinks: DashMap<String, Arc<dyn StatusSink>>,
}

impl SinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the sink for a device.
    pub fn register(&self, name: impl Into<String>, sink: Arc<dyn StatusSink>) {
        self.sinks.insert(name.into(), sink);
    }

    /// Remove a device's sink. Returns `true` if one was registered.
    pub fn unregister(&self, name: &str) -> bool {
        self.sinks.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl SinkRegistry for SinkSet {
    fn sinks(&self) -> Vec<Arc<dyn StatusSink>> {
        self.sinks.iter().map(|e| Arc::clone(e.value())).collect()
    }
}
