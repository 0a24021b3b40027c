//! Displays frames on the host map.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::frames::{FrameSet, FrameSetManager, Playhead};
use crate::host::{MapHost, PlaybackObserver};

/// Applies frames to the radar layer and owns the playback cursor.
pub struct FramePresenter {
    host: Arc<dyn MapHost>,
    layer_id: String,
    frames: Arc<FrameSetManager>,
    cursor: Mutex<Option<usize>>,
    observer: Arc<dyn PlaybackObserver>,
}

impl FramePresenter {
    pub fn new(
        host: Arc<dyn MapHost>,
        layer_id: impl Into<String>,
        frames: Arc<FrameSetManager>,
        observer: Arc<dyn PlaybackObserver>,
    ) -> Self {
        Self {
            host,
            layer_id: layer_id.into(),
            frames,
            cursor: Mutex::new(None),
            observer,
        }
    }

    /// Id of the layer whose time is driven.
    pub fn layer_id(&self) -> &str {
        &self.layer_id
    }

    /// Current frame set.
    pub fn frames(&self) -> FrameSet {
        self.frames.current()
    }

    /// Time identifier of the displayed frame.
    pub fn current_time(&self) -> Option<String> {
        let cursor = (*self.cursor.lock())?;
        self.frames.current().get(cursor).map(str::to_string)
    }
}

impl Playhead for FramePresenter {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn cursor(&self) -> Option<usize> {
        *self.cursor.lock()
    }

    fn apply_frame(&self, index: usize) -> bool {
        let frames = self.frames.current();
        let Some(time) = frames.get(index) else {
            trace!(index, frames = frames.len(), "Frame index out of range");
            return false;
        };

        if let Err(e) = self.host.set_time_parameter(&self.layer_id, time) {
            debug!(layer = %self.layer_id, error = %e, "Failed to set TIME parameter");
        }
        if let Err(e) = self.host.refresh_layer(&self.layer_id) {
            debug!(layer = %self.layer_id, error = %e, "Layer refresh failed");
        }

        *self.cursor.lock() = Some(index);
        self.observer.on_cursor(index);
        self.observer.on_timestamp(time);
        true
    }
}
