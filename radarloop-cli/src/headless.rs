//! Terminal stand-ins for the map and the playback UI.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use radarloop::host::{
    HostError, LayerSpec, MapHost, PlaybackObserver, StationaryCallback, SubscriptionId,
};
use radarloop::time::format_timestamp;
use radarloop::wms::Viewport;
use tracing::{debug, info};

/// A map with a fixed viewport that logs what would be drawn.
pub struct HeadlessMap {
    viewport: Viewport,
    layers: Mutex<Vec<LayerSpec>>,
    subscribers: Mutex<HashMap<u64, StationaryCallback>>,
    next_subscription: AtomicU64,
}

impl HeadlessMap {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            layers: Mutex::new(Vec::new()),
            subscribers: Mutex::new(HashMap::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Number of live stationary subscriptions.
    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.lock().iter().any(|l| l.id() == id)
    }
}

impl MapHost for HeadlessMap {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn add_layer(&self, layer: LayerSpec, position: Option<usize>) -> Result<(), HostError> {
        let mut layers = self.layers.lock();
        let index = position.unwrap_or(layers.len()).min(layers.len());
        match &layer {
            LayerSpec::TimeAnimated { id, url, layer, .. } => {
                info!(id = %id, url = %url, layer = %layer, index, "WMS layer added");
            }
            LayerSpec::Fallback { id, url, .. } => {
                info!(id = %id, url = %url, index, "Fallback image layer added");
            }
        }
        layers.insert(index, layer);
        Ok(())
    }

    fn remove_layer(&self, id: &str) -> Result<(), HostError> {
        let mut layers = self.layers.lock();
        let before = layers.len();
        layers.retain(|l| l.id() != id);
        if layers.len() == before {
            return Err(HostError::LayerNotFound(id.to_string()));
        }
        Ok(())
    }

    fn layer_position(&self, id: &str) -> Option<usize> {
        self.layers.lock().iter().position(|l| l.id() == id)
    }

    fn set_time_parameter(&self, id: &str, time: &str) -> Result<(), HostError> {
        if !self.has_layer(id) {
            return Err(HostError::LayerNotFound(id.to_string()));
        }
        debug!(layer = id, time, "TIME parameter set");
        Ok(())
    }

    fn refresh_layer(&self, id: &str) -> Result<(), HostError> {
        if !self.has_layer(id) {
            return Err(HostError::LayerNotFound(id.to_string()));
        }
        debug!(layer = id, "Layer refreshed");
        Ok(())
    }

    fn subscribe_stationary(&self, callback: StationaryCallback) -> SubscriptionId {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().insert(id, callback);
        SubscriptionId(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.lock().remove(&id.0);
    }
}

/// Prints status and frame changes to stdout.
pub struct ConsoleObserver {
    relative: bool,
    frame_count: AtomicUsize,
    cursor: AtomicUsize,
}

impl ConsoleObserver {
    pub fn new(relative: bool) -> Arc<Self> {
        Arc::new(Self {
            relative,
            frame_count: AtomicUsize::new(0),
            cursor: AtomicUsize::new(0),
        })
    }
}

impl PlaybackObserver for ConsoleObserver {
    fn on_status(&self, status: &str) {
        println!("{}", status);
    }

    fn on_timestamp(&self, timestamp: &str) {
        let shown = format_timestamp(timestamp, self.relative, chrono::Utc::now());
        println!(
            "  frame {}/{}  {}",
            self.cursor.load(Ordering::Relaxed) + 1,
            self.frame_count.load(Ordering::Relaxed),
            shown
        );
    }

    fn on_cursor(&self, index: usize) {
        self.cursor.store(index, Ordering::Relaxed);
    }

    fn on_playing(&self, playing: bool) {
        println!("{}", if playing { "▶ playing" } else { "⏸ paused" });
    }

    fn on_frame_count(&self, count: usize) {
        self.frame_count.store(count, Ordering::Relaxed);
    }
}
