//! Bounded sliding window of frame identifiers.
//!
//! The current [`FrameSet`] is an immutable shared slice. A merge that finds
//! new identifiers swaps in a fresh slice, so readers holding the previous
//! set keep a consistent view.

use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

/// Default number of frames kept.
pub const DEFAULT_MAX_FRAMES: usize = 30;

/// Ordered, deduplicated time identifiers, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSet(Arc<[String]>);

impl FrameSet {
    /// The empty set.
    pub fn empty() -> Self {
        Self(Arc::from(Vec::<String>::new()))
    }

    /// Identifier at `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Index of the newest frame.
    pub fn last_index(&self) -> Option<usize> {
        self.0.len().checked_sub(1)
    }

    /// Copy out the identifiers.
    pub fn to_vec(&self) -> Vec<String> {
        self.0.to_vec()
    }
}

impl Default for FrameSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl Deref for FrameSet {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for FrameSet {
    fn from(frames: Vec<String>) -> Self {
        Self(Arc::from(frames))
    }
}

/// Keep the last `max_frames` distinct identifiers, first occurrence wins.
pub fn bound_frames(discovered: &[String], max_frames: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let unique: Vec<&String> = discovered.iter().filter(|t| seen.insert(t.as_str())).collect();
    let skip = unique.len().saturating_sub(max_frames);
    unique.into_iter().skip(skip).cloned().collect()
}

/// Playback position over the current frame set.
///
/// Shared by animation, refresh and scrubbing; implementations display the
/// frame when it is applied.
pub trait Playhead: Send + Sync {
    /// Number of frames in the current set.
    fn frame_count(&self) -> usize;

    /// Index of the displayed frame, if any.
    fn cursor(&self) -> Option<usize>;

    /// Display the frame at `index`. Out-of-range indices are ignored and
    /// return false.
    fn apply_frame(&self, index: usize) -> bool;
}

/// Result of reconciling a discovery pass with the current set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The set after the merge.
    pub frames: FrameSet,
    /// Identifiers not present before, in discovered order.
    pub newly_added: Vec<String>,
    /// The caller was watching the live edge and should follow it.
    pub cursor_should_advance: bool,
    /// Cursor the caller should apply when `cursor_should_advance` is set.
    pub cursor: Option<usize>,
}

impl MergeOutcome {
    /// Returns true if the merge replaced the set.
    pub fn changed(&self) -> bool {
        !self.newly_added.is_empty()
    }
}

/// Owner of the current frame set.
#[derive(Debug)]
pub struct FrameSetManager {
    max_frames: usize,
    current: RwLock<FrameSet>,
}

impl Default for FrameSetManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAMES)
    }
}

impl FrameSetManager {
    /// Create an empty manager keeping at most `max_frames` frames.
    pub fn new(max_frames: usize) -> Self {
        Self {
            max_frames,
            current: RwLock::new(FrameSet::empty()),
        }
    }

    /// Capacity.
    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    /// The current set.
    pub fn current(&self) -> FrameSet {
        self.current.read().clone()
    }

    /// Number of frames in the current set.
    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    /// Returns true when no frames are known.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reconcile `discovered` with the current set.
    ///
    /// When nothing new was discovered the set is left untouched. Otherwise
    /// it is replaced by the bounded discovery, and a cursor that was unset,
    /// on the previous newest frame, or out of range moves to the new newest.
    pub fn merge(&self, discovered: &[String], cursor: Option<usize>) -> MergeOutcome {
        let bounded = bound_frames(discovered, self.max_frames);
        let mut current = self.current.write();

        let newly_added: Vec<String> = bounded
            .iter()
            .filter(|t| !current.contains(*t))
            .cloned()
            .collect();

        if newly_added.is_empty() {
            debug!(frames = current.len(), "No new frames discovered");
            return MergeOutcome {
                frames: current.clone(),
                newly_added,
                cursor_should_advance: false,
                cursor,
            };
        }

        let previous_len = current.len();
        let frames = FrameSet::from(bounded);
        *current = frames.clone();
        drop(current);

        let cursor_should_advance = match cursor {
            None => true,
            Some(index) => index + 1 >= previous_len || index >= frames.len(),
        };
        let cursor = if cursor_should_advance {
            frames.last_index()
        } else {
            cursor
        };

        debug!(
            added = newly_added.len(),
            frames = frames.len(),
            follow_live = cursor_should_advance,
            "Frame set updated"
        );

        MergeOutcome {
            frames,
            newly_added,
            cursor_should_advance,
            cursor,
        }
    }
}
