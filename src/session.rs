//! Coordinating context for one annotator.
//!
//! [`AnnotatorSession`] owns the reconciliation engine, the working subset
//! and the draw state machine, and is driven by discrete events from an
//! adapter layer (pointer events, video selection, save requests). All
//! methods run to completion; the only suspension points are the store
//! round-trips, which are split into a request and a completion so the
//! adapter can run them asynchronously.
//!
//! Edits are accepted while a save is pending. The save carries a snapshot
//! taken when it was requested, so later edits stay dirty and go out with
//! the next save. A second save cannot be requested until the first one
//! completes. A load applied while a save is pending wins over the save's
//! snapshot: the completed save no longer replaces the installed collection.

use crate::backend::{AnnotationBackend, PlaybackSurface, SaveReceipt};
use crate::constants::MIN_BOX_SIZE;
use crate::coords::CoordinateMapper;
use crate::draw::{CommitOutcome, DrawSession, GestureOutcome, LabelResponse, PendingBox};
use crate::error::{BackendError, SessionError};
use crate::model::{
    AnnotationBox, AnnotationCollection, AnnotationEntry, LabelVocabulary, Point, Rect,
};
use crate::reconcile::ReconciliationEngine;
use crate::store::AnnotationStore;
use crate::timeline::TimeBucketIndex;

/// A save handed to the adapter for delivery to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    /// Identifies the request in [`AnnotatorSession::complete_save`].
    pub id: u64,
    /// Video whose working subset was merged.
    pub video: String,
    /// Full collection to persist.
    pub collection: AnnotationCollection,
}

/// A box ready to be drawn on the display surface.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayBox {
    /// Rectangle in display pixels.
    pub rect: Rect,
    pub label: String,
    /// Entry index in [`AnnotatorSession::current_entries`].
    pub entry: usize,
    /// Box index inside the entry.
    pub index: usize,
}

#[derive(Debug, Clone)]
struct InFlightSave {
    id: u64,
    video: String,
    collection: AnnotationCollection,
    /// A load was applied after the request was made.
    superseded: bool,
}

/// Annotation state for one user and one selected video.
#[derive(Debug, Clone)]
pub struct AnnotatorSession {
    engine: ReconciliationEngine,
    store: AnnotationStore,
    draw: DrawSession,
    pending_label: Option<PendingBox>,
    in_flight: Option<InFlightSave>,
    next_request_id: u64,
    status_message: Option<String>,
}

impl Default for AnnotatorSession {
    fn default() -> Self {
        Self::new(TimeBucketIndex::default(), MIN_BOX_SIZE)
    }
}

impl AnnotatorSession {
    pub fn new(index: TimeBucketIndex, min_box_size: f64) -> Self {
        Self {
            engine: ReconciliationEngine::new(index),
            store: AnnotationStore::with_index(index),
            draw: DrawSession::new(min_box_size),
            pending_label: None,
            in_flight: None,
            next_request_id: 1,
            status_message: None,
        }
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Apply the outcome of fetching the full collection.
    ///
    /// On failure the last-known-good collection is kept. On success the
    /// working subset is reseeded unless it holds unsaved edits.
    pub fn apply_load(&mut self, result: Result<AnnotationCollection, BackendError>) -> bool {
        match result {
            Ok(collection) => {
                if let Some(save) = self.in_flight.as_mut() {
                    log::debug!("Load applied while save {} is pending", save.id);
                    save.superseded = true;
                }
                self.engine.install(collection);
                if let Some(video) = self.store.video().map(str::to_string) {
                    if self.store.is_dirty() {
                        log::debug!("Keeping unsaved edits of {} across reload", video);
                    } else {
                        self.engine.reseed(&mut self.store, &video);
                    }
                }
                self.status_message = Some("Loaded existing annotations.".to_string());
                true
            }
            Err(e) => {
                log::error!("Failed to load annotations: {}", e);
                self.status_message = Some(format!("Failed to load annotations: {}", e));
                false
            }
        }
    }

    /// Fetch from `backend` and apply the result.
    pub fn load_from(&mut self, backend: &dyn AnnotationBackend) -> bool {
        self.apply_load(backend.fetch_all())
    }

    /// Select `video` and copy its entries into the working subset.
    ///
    /// Unsaved edits of the previously selected video are discarded, as is
    /// any gesture or label prompt in progress.
    pub fn on_video_loaded(&mut self, video: &str) {
        if self.store.is_dirty() {
            log::warn!(
                "⚠️ Discarding unsaved edits of {}",
                self.store.video().unwrap_or_default()
            );
        }
        if self.pending_label.take().is_some() {
            log::debug!("Dropped pending label prompt on video change");
        }
        self.draw.cancel();
        self.engine.reseed(&mut self.store, video);
        log::info!(
            "🎬 Selected {} ({} entries, {} boxes)",
            video,
            self.store.len(),
            self.store.total_boxes()
        );
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    /// Toggle annotation mode. Returns the new state.
    pub fn on_mode_toggled(&mut self) -> bool {
        let enabled = self.draw.toggle_mode();
        self.status_message = Some(mode_message(enabled).to_string());
        log::debug!("🖌️ Annotation mode: {}", enabled);
        enabled
    }

    /// Pointer pressed on the display surface. Returns whether a gesture began.
    pub fn on_pointer_down(&mut self, point: Point) -> bool {
        if self.pending_label.is_some() {
            log::debug!("Pointer down ignored while a label is pending");
            return false;
        }
        self.draw.start(point)
    }

    /// Pointer moved. Returns the preview rectangle while dragging.
    pub fn on_pointer_move(&mut self, point: Point) -> Option<Rect> {
        self.draw.update(point)
    }

    /// Pointer released. Returns true if a label must now be requested.
    ///
    /// Annotation mode is switched off after every gesture.
    pub fn on_pointer_up(
        &mut self,
        point: Point,
        surface: &dyn PlaybackSurface,
    ) -> Result<bool, SessionError> {
        if !self.draw.is_dragging() {
            return Ok(false);
        }
        let Some(video) = self.store.video().map(str::to_string) else {
            self.draw.disable();
            self.status_message = Some(mode_message(false).to_string());
            return Err(SessionError::NoVideoSelected);
        };

        let mapper =
            CoordinateMapper::new(surface.display_dimensions(), surface.source_dimensions());
        let outcome = self
            .draw
            .finish(point, mapper.as_ref(), surface.current_time(), &video);
        self.status_message = Some(mode_message(false).to_string());

        match outcome {
            GestureOutcome::Pending(pending) => {
                self.pending_label = Some(pending);
                Ok(true)
            }
            GestureOutcome::Discarded(reason) => {
                log::debug!("Gesture discarded: {:?}", reason);
                Ok(false)
            }
        }
    }

    /// The box waiting for a label, if any.
    pub fn pending_label(&self) -> Option<&PendingBox> {
        self.pending_label.as_ref()
    }

    /// Deliver the label collaborator's answer.
    ///
    /// Returns `None` if no label was pending.
    pub fn resolve_label(&mut self, response: LabelResponse) -> Option<CommitOutcome> {
        let pending = self.pending_label.take()?;
        Some(pending.commit(response, &mut self.store))
    }

    /// Delete a box from the working subset.
    pub fn remove_box(
        &mut self,
        entry_index: usize,
        box_index: usize,
    ) -> Result<AnnotationBox, SessionError> {
        let removed = self.store.remove_box(entry_index, box_index)?;
        log::info!("🗑️ Deleted '{}' (entry {}, box {})", removed.label, entry_index, box_index);
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------

    /// Merge the working subset into the full collection for persisting.
    pub fn on_save_requested(&mut self) -> Result<SaveRequest, SessionError> {
        if self.in_flight.is_some() {
            return Err(SessionError::SaveInFlight);
        }
        if self.pending_label.is_some() {
            return Err(SessionError::LabelPending);
        }
        let video = self
            .store
            .video()
            .map(str::to_string)
            .ok_or(SessionError::NoVideoSelected)?;
        let collection = self
            .engine
            .commit(&self.store)
            .ok_or(SessionError::NoVideoSelected)?;

        let id = self.next_request_id;
        self.next_request_id += 1;
        self.store.mark_clean();
        self.in_flight = Some(InFlightSave {
            id,
            video: video.clone(),
            collection: collection.clone(),
            superseded: false,
        });
        self.status_message = Some("Saving annotations...".to_string());
        log::debug!("💾 Save request {} for {} ({} entries)", id, video, collection.len());

        Ok(SaveRequest {
            id,
            video,
            collection,
        })
    }

    /// Apply the store's answer to a save request.
    ///
    /// Returns whether the save succeeded. Failures are reported through the
    /// status message and leave the working subset marked dirty.
    pub fn complete_save(
        &mut self,
        id: u64,
        result: Result<SaveReceipt, BackendError>,
    ) -> Result<bool, SessionError> {
        let in_flight = match self.in_flight.take() {
            Some(save) if save.id == id => save,
            other => {
                self.in_flight = other;
                return Err(SessionError::UnknownSaveRequest(id));
            }
        };

        match result {
            Ok(receipt) => {
                if !in_flight.superseded {
                    self.engine.install(in_flight.collection);
                }
                log::info!("💾 Save {} complete: {}", id, receipt.message);
                self.status_message = Some(receipt.message);
                Ok(true)
            }
            Err(e) => {
                log::error!("Failed to save annotations: {}", e);
                // Edits of a video that was switched away from are gone
                if self.store.video() == Some(in_flight.video.as_str()) {
                    self.store.mark_dirty();
                }
                self.status_message = Some(format!("Failed to save annotations: {}", e));
                Ok(false)
            }
        }
    }

    /// Save through `backend`, then reload from it.
    pub fn save_to(&mut self, backend: &dyn AnnotationBackend) -> Result<bool, SessionError> {
        let request = self.on_save_requested()?;
        let result = backend.persist(&request.collection);
        let saved = self.complete_save(request.id, result)?;
        if saved {
            let message = self.status_message.take();
            self.load_from(backend);
            // Report the save, not the reload
            if message.is_some() {
                self.status_message = message;
            }
        }
        Ok(saved)
    }

    // ------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------

    /// Working subset sorted by timestamp.
    pub fn current_entries(&self) -> &[AnnotationEntry] {
        self.store.list()
    }

    pub fn vocabulary(&self) -> &LabelVocabulary {
        self.engine.vocabulary()
    }

    /// Last-known-good full collection.
    pub fn collection(&self) -> &AnnotationCollection {
        self.engine.collection()
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn current_video(&self) -> Option<&str> {
        self.store.video()
    }

    /// Bounding boxes at the surface's playback time, in display pixels.
    ///
    /// Empty when the dimensions do not allow mapping.
    pub fn visible_boxes(&self, surface: &dyn PlaybackSurface) -> Vec<DisplayBox> {
        let Some(mapper) =
            CoordinateMapper::new(surface.display_dimensions(), surface.source_dimensions())
        else {
            return Vec::new();
        };
        let t = surface.current_time();
        let index = self.store.bucket_index();

        let mut boxes = Vec::new();
        for (entry_idx, entry) in self.store.list().iter().enumerate() {
            if !index.same_bucket(entry.timestamp, t) {
                continue;
            }
            for (box_idx, annotation) in entry.boxes.iter().enumerate() {
                if let Some(rect) = annotation.shape.as_rect() {
                    boxes.push(DisplayBox {
                        rect: mapper.to_display(rect),
                        label: annotation.label.clone(),
                        entry: entry_idx,
                        index: box_idx,
                    });
                }
            }
        }
        boxes
    }

    /// Rectangle of the gesture in progress.
    pub fn preview(&self) -> Option<Rect> {
        self.draw.preview()
    }

    /// Playback position to jump to when an entry is picked from the list.
    pub fn seek_target(&self, entry_index: usize) -> Option<f64> {
        self.store.get(entry_index).map(|e| e.timestamp)
    }

    pub fn annotation_mode(&self) -> bool {
        self.draw.is_enabled()
    }

    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn status(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

fn mode_message(enabled: bool) -> &'static str {
    if enabled {
        "Annotation mode on: drag on the video to draw a box."
    } else {
        "Annotation mode off."
    }
}
