//! Rectangle drawing gesture state machine.
//!
//! A gesture runs `Idle -> Dragging -> Idle`. Gestures are only accepted
//! while annotation mode is enabled, and finishing a gesture (kept or
//! discarded) always switches annotation mode off again: one activation
//! allows exactly one box.
//!
//! Finishing a large enough gesture does not touch the store directly. It
//! yields a [`PendingBox`] that waits for a label and is committed (or
//! dropped) once the label collaborator answers.

use crate::constants::MIN_BOX_SIZE;
use crate::coords::CoordinateMapper;
use crate::model::{AnnotationBox, Point, Rect};
use crate::store::{AnnotationStore, BoxLocation, is_valid_timestamp};

/// Gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DrawState {
    /// Not currently drawing anything.
    #[default]
    Idle,
    /// Pointer is down; `anchor` is where it went down.
    Dragging { anchor: Point, current: Point },
}

/// Why a gesture produced no box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiscardReason {
    /// `finish` arrived without a matching `start`
    NotDragging,
    /// One side was not larger than the minimum display size
    TooSmall { width: f64, height: f64 },
    /// Display or source dimensions were unusable
    MappingUnavailable,
    /// The label prompt was dismissed
    LabelCancelled,
    /// The label prompt returned only whitespace
    EmptyLabel,
    /// Playback time was negative or not a number
    InvalidTimestamp,
}

/// Result of finishing a gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Nothing will be created.
    Discarded(DiscardReason),
    /// A box waits for its label.
    Pending(PendingBox),
}

/// Answer of the label collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelResponse {
    Label(String),
    Cancelled,
}

impl From<Option<String>> for LabelResponse {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(label) => LabelResponse::Label(label),
            None => LabelResponse::Cancelled,
        }
    }
}

/// Result of resolving a pending box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommitOutcome {
    Committed(BoxLocation),
    Discarded(DiscardReason),
}

/// A finished gesture, already mapped to source space, awaiting a label.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingBox {
    /// Video the box belongs to.
    pub video: String,
    /// Playback position when the gesture finished.
    pub timestamp: f64,
    /// Rectangle in source-video pixels.
    pub rect: Rect,
    /// Rectangle as drawn on screen.
    pub display_rect: Rect,
}

impl PendingBox {
    /// Store the box under the given label, or drop it on cancellation.
    pub fn commit(self, response: LabelResponse, store: &mut AnnotationStore) -> CommitOutcome {
        let label = match response {
            LabelResponse::Cancelled => {
                log::debug!("❌ Label prompt cancelled, box discarded");
                return CommitOutcome::Discarded(DiscardReason::LabelCancelled);
            }
            LabelResponse::Label(label) => label,
        };

        let label = label.trim();
        if label.is_empty() {
            log::debug!("❌ Empty label, box discarded");
            return CommitOutcome::Discarded(DiscardReason::EmptyLabel);
        }

        let location = match store.add_box(
            self.timestamp,
            &self.video,
            AnnotationBox::bbox(self.rect, label),
        ) {
            Ok(location) => location,
            Err(e) => {
                log::warn!("⚠️ Box '{}' discarded: {}", label, e);
                return CommitOutcome::Discarded(DiscardReason::InvalidTimestamp);
            }
        };
        log::info!(
            "✅ Created bbox '{}' on {} at {:.2}s ({:.1}, {:.1}, {:.1}x{:.1})",
            label,
            self.video,
            self.timestamp,
            self.rect.x,
            self.rect.y,
            self.rect.width,
            self.rect.height
        );
        CommitOutcome::Committed(location)
    }
}

/// Drawing state plus the annotation-mode switch that gates it.
#[derive(Debug, Clone)]
pub struct DrawSession {
    state: DrawState,
    enabled: bool,
    min_size: f64,
}

impl Default for DrawSession {
    fn default() -> Self {
        Self::new(MIN_BOX_SIZE)
    }
}

impl DrawSession {
    /// Create a disabled session with the given minimum box side (display px).
    pub fn new(min_size: f64) -> Self {
        Self {
            state: DrawState::Idle,
            enabled: false,
            min_size,
        }
    }

    pub fn state(&self) -> DrawState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DrawState::Dragging { .. })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Leave annotation mode, abandoning any gesture in progress.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.state = DrawState::Idle;
    }

    /// Flip annotation mode and return the new value.
    pub fn toggle_mode(&mut self) -> bool {
        if self.enabled {
            self.disable();
        } else {
            self.enable();
        }
        self.enabled
    }

    /// Begin a gesture. Ignored (returns false) while disabled.
    pub fn start(&mut self, point: Point) -> bool {
        if !self.enabled {
            return false;
        }
        self.state = DrawState::Dragging {
            anchor: point,
            current: point,
        };
        log::debug!("✏️ Started bbox at ({:.1}, {:.1})", point.x, point.y);
        true
    }

    /// Track the pointer and return the preview rectangle.
    pub fn update(&mut self, point: Point) -> Option<Rect> {
        match &mut self.state {
            DrawState::Dragging { anchor, current } => {
                *current = point;
                Some(Rect::from_corners(*anchor, point))
            }
            DrawState::Idle => None,
        }
    }

    /// Rectangle of the gesture in progress, in display space.
    pub fn preview(&self) -> Option<Rect> {
        match self.state {
            DrawState::Dragging { anchor, current } => Some(Rect::from_corners(anchor, current)),
            DrawState::Idle => None,
        }
    }

    /// End the gesture at `point`.
    ///
    /// Returns to `Idle` and leaves annotation mode whether or not a box
    /// comes out of it. A `finish` without a gesture in progress changes
    /// nothing. The rectangle is clipped to the display surface before the
    /// size check, so boxes never start outside the frame.
    pub fn finish(
        &mut self,
        point: Point,
        mapper: Option<&CoordinateMapper>,
        timestamp: f64,
        video: &str,
    ) -> GestureOutcome {
        let DrawState::Dragging { anchor, .. } = self.state else {
            return GestureOutcome::Discarded(DiscardReason::NotDragging);
        };
        self.disable();

        if !is_valid_timestamp(timestamp) {
            log::warn!("⚠️ Playback time {} is not usable, gesture discarded", timestamp);
            return GestureOutcome::Discarded(DiscardReason::InvalidTimestamp);
        }

        let mut display_rect = Rect::from_corners(anchor, point);
        if let Some(mapper) = mapper {
            display_rect = display_rect.clamp_to(mapper.display_size());
        }
        if !display_rect.exceeds(self.min_size) {
            log::debug!(
                "📏 Gesture too small ({:.1}x{:.1}), discarded",
                display_rect.width,
                display_rect.height
            );
            return GestureOutcome::Discarded(DiscardReason::TooSmall {
                width: display_rect.width,
                height: display_rect.height,
            });
        }

        let Some(mapper) = mapper else {
            log::warn!("Video dimensions unavailable, gesture discarded");
            return GestureOutcome::Discarded(DiscardReason::MappingUnavailable);
        };

        GestureOutcome::Pending(PendingBox {
            video: video.to_string(),
            timestamp,
            rect: mapper.to_source(display_rect),
            display_rect,
        })
    }

    /// Abandon the gesture in progress but stay in annotation mode.
    pub fn cancel(&mut self) {
        self.state = DrawState::Idle;
    }
}
