//! Collaborator interfaces consumed by the annotation core.

use crate::error::BackendError;
use crate::model::{AnnotationCollection, Size};

/// Acknowledgement returned by a store after a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    /// Message shown to the user as-is.
    pub message: String,
}

impl SaveReceipt {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The external annotation store.
///
/// Saves always send the full collection, never a diff.
pub trait AnnotationBackend {
    /// Load every entry of every video.
    fn fetch_all(&self) -> Result<AnnotationCollection, BackendError>;

    /// Replace the stored collection.
    fn persist(&self, collection: &AnnotationCollection) -> Result<SaveReceipt, BackendError>;
}

/// Read-only view of the video player and its on-screen element.
pub trait PlaybackSurface {
    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Native resolution of the video. Zero until metadata is available.
    fn source_dimensions(&self) -> Size;

    /// Size of the element the video is rendered into.
    fn display_dimensions(&self) -> Size;
}

/// A surface with fixed values, for headless use.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FixedPlayback {
    pub time: f64,
    pub source: Size,
    pub display: Size,
}

impl FixedPlayback {
    pub fn new(time: f64, source: Size, display: Size) -> Self {
        Self {
            time,
            source,
            display,
        }
    }
}

impl PlaybackSurface for FixedPlayback {
    fn current_time(&self) -> f64 {
        self.time
    }

    fn source_dimensions(&self) -> Size {
        self.source
    }

    fn display_dimensions(&self) -> Size {
        self.display
    }
}
