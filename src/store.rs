//! Working subset of annotations for the active video.
//!
//! The store owns deep copies of the entries of one video. Entries are kept
//! sorted by timestamp at all times, so the indices returned by
//! [`AnnotationStore::list`] stay valid for [`AnnotationStore::remove_box`]
//! until the next mutation.

use crate::error::StoreError;
use crate::model::{AnnotationBox, AnnotationEntry};
use crate::timeline::TimeBucketIndex;

/// Position of a box inside the working subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxLocation {
    /// Index of the entry in [`AnnotationStore::list`].
    pub entry: usize,
    /// Index of the box inside that entry.
    pub index: usize,
}

/// Storage for the entries of the currently selected video.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    video: Option<String>,
    entries: Vec<AnnotationEntry>,
    index: TimeBucketIndex,
    /// Set on every edit, cleared once the edits have been handed to a save.
    dirty: bool,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that buckets with a custom epsilon.
    pub fn with_index(index: TimeBucketIndex) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Replace the working subset with copies of the entries of `video`.
    ///
    /// Duplicate buckets in the source are collapsed. Returns the number of
    /// duplicates that were folded together.
    pub fn load(&mut self, entries: &[AnnotationEntry], video: &str) -> usize {
        let matching = entries.iter().filter(|e| e.video == video).cloned();
        let (mut collapsed, folded) = self.index.collapse_duplicates(matching);
        collapsed.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        if folded > 0 {
            log::warn!(
                "⚠️ Merged {} duplicate timestamp buckets while loading {}",
                folded,
                video
            );
        }
        log::debug!(
            "📂 Working subset for {}: {} entries",
            video,
            collapsed.len()
        );

        self.video = Some(video.to_string());
        self.entries = collapsed;
        self.dirty = false;
        folded
    }

    /// Append a box to the bucket at `timestamp`, creating the bucket if needed.
    ///
    /// Fails without touching the store if `timestamp` is negative or not
    /// finite.
    pub fn add_box(
        &mut self,
        timestamp: f64,
        video: &str,
        annotation: AnnotationBox,
    ) -> Result<BoxLocation, StoreError> {
        if !is_valid_timestamp(timestamp) {
            return Err(StoreError::InvalidTimestamp(timestamp));
        }

        match self.video.as_deref() {
            None => self.video = Some(video.to_string()),
            Some(active) if active != video => {
                log::warn!("Adding box for {} to the working subset of {}", video, active);
            }
            Some(_) => {}
        }

        let entry = self.index.find_or_create(&mut self.entries, timestamp, video);
        let boxes = &mut self.entries[entry].boxes;
        boxes.push(annotation);
        self.dirty = true;

        Ok(BoxLocation {
            entry,
            index: boxes.len() - 1,
        })
    }

    /// Remove one box. An entry left without boxes is removed as well.
    pub fn remove_box(
        &mut self,
        entry_index: usize,
        box_index: usize,
    ) -> Result<AnnotationBox, StoreError> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(entry_index)
            .ok_or(StoreError::EntryNotFound {
                index: entry_index,
                len,
            })?;

        if box_index >= entry.boxes.len() {
            return Err(StoreError::BoxNotFound {
                entry: entry_index,
                index: box_index,
                len: entry.boxes.len(),
            });
        }

        let removed = entry.boxes.remove(box_index);
        if entry.boxes.is_empty() {
            self.entries.remove(entry_index);
        }
        self.dirty = true;
        Ok(removed)
    }

    /// Entries sorted by ascending timestamp.
    pub fn list(&self) -> &[AnnotationEntry] {
        &self.entries
    }

    pub fn get(&self, entry_index: usize) -> Option<&AnnotationEntry> {
        self.entries.get(entry_index)
    }

    /// Index of the bucket containing `t`, if any.
    pub fn find_bucket(&self, t: f64) -> Option<usize> {
        self.index.find_bucket(&self.entries, t)
    }

    /// Entries visible at playback time `t`.
    pub fn query(&self, t: f64) -> impl Iterator<Item = &AnnotationEntry> {
        self.index.window(&self.entries, t)
    }

    /// Copy of the working subset for handing to a save.
    pub fn snapshot(&self) -> Vec<AnnotationEntry> {
        self.entries.clone()
    }

    pub fn video(&self) -> Option<&str> {
        self.video.as_deref()
    }

    pub fn bucket_index(&self) -> TimeBucketIndex {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_boxes(&self) -> usize {
        self.entries.iter().map(|e| e.boxes.len()).sum()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

/// Whether `t` can be stored as a playback position.
pub fn is_valid_timestamp(t: f64) -> bool {
    t.is_finite() && t >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rect;

    fn bbox(label: &str) -> AnnotationBox {
        AnnotationBox::bbox(Rect::new(10.0, 10.0, 50.0, 50.0), label)
    }

    fn sample_collection() -> Vec<AnnotationEntry> {
        vec![
            AnnotationEntry::new("a.mp4", 1.0)
                .with_box(bbox("person"))
                .with_box(bbox("dog")),
            AnnotationEntry::new("b.mp4", 3.0).with_box(bbox("car")),
        ]
    }

    #[test]
    fn test_load_filters_by_video() {
        let mut store = AnnotationStore::new();
        store.load(&sample_collection(), "a.mp4");

        assert_eq!(store.video(), Some("a.mp4"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].boxes.len(), 2);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_load_copies_source() {
        let source = sample_collection();
        let mut store = AnnotationStore::new();
        store.load(&source, "a.mp4");

        store.add_box(1.0, "a.mp4", bbox("car")).unwrap();
        store.remove_box(0, 0).unwrap();

        assert_eq!(source[0].boxes.len(), 2);
        assert_eq!(source[0].boxes[0].label, "person");
    }

    #[test]
    fn test_load_sorts_and_collapses() {
        let source = vec![
            AnnotationEntry::new("a.mp4", 5.0).with_box(bbox("late")),
            AnnotationEntry::new("a.mp4", 1.0).with_box(bbox("early")),
            AnnotationEntry::new("a.mp4", 5.02).with_box(bbox("dup")),
        ];
        let mut store = AnnotationStore::new();
        let folded = store.load(&source, "a.mp4");

        assert_eq!(folded, 1);
        let times: Vec<f64> = store.list().iter().map(|e| e.timestamp).collect();
        assert_eq!(times, vec![1.0, 5.0]);
        assert_eq!(store.list()[1].boxes.len(), 2);
    }

    #[test]
    fn test_add_box_joins_existing_bucket() {
        let mut store = AnnotationStore::new();
        store.load(&sample_collection(), "a.mp4");

        let loc = store.add_box(1.05, "a.mp4", bbox("car")).unwrap();
        assert_eq!(loc, BoxLocation { entry: 0, index: 2 });
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].boxes.len(), 3);
        assert!(store.is_dirty());
    }

    #[test]
    fn test_add_box_creates_bucket() {
        let mut store = AnnotationStore::new();
        store.load(&sample_collection(), "a.mp4");

        let loc = store.add_box(0.5, "a.mp4", bbox("car")).unwrap();
        assert_eq!(loc.entry, 0);
        assert_eq!(store.len(), 2);
        assert_eq!(store.list()[0].timestamp, 0.5);
    }

    #[test]
    fn test_add_then_remove_restores() {
        let mut store = AnnotationStore::new();
        store.load(&sample_collection(), "a.mp4");
        let before = store.list().to_vec();

        let loc = store.add_box(1.02, "a.mp4", bbox("car")).unwrap();
        store.remove_box(loc.entry, loc.index).unwrap();
        assert_eq!(store.list(), before.as_slice());

        let loc = store.add_box(7.0, "a.mp4", bbox("car")).unwrap();
        store.remove_box(loc.entry, loc.index).unwrap();
        assert_eq!(store.list(), before.as_slice());
    }

    #[test]
    fn test_remove_last_box_prunes_entry() {
        let mut store = AnnotationStore::new();
        store.load(&sample_collection(), "b.mp4");

        let removed = store.remove_box(0, 0).unwrap();
        assert_eq!(removed.label, "car");
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut store = AnnotationStore::new();
        store.load(&sample_collection(), "a.mp4");

        assert_eq!(
            store.remove_box(3, 0),
            Err(StoreError::EntryNotFound { index: 3, len: 1 })
        );
        assert_eq!(
            store.remove_box(0, 2),
            Err(StoreError::BoxNotFound {
                entry: 0,
                index: 2,
                len: 2
            })
        );
        assert_eq!(store.total_boxes(), 2);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_add_box_rejects_invalid_timestamp() {
        let mut store = AnnotationStore::new();
        store.load(&sample_collection(), "a.mp4");
        let before = store.list().to_vec();

        for t in [f64::NAN, f64::INFINITY, -0.5] {
            assert!(matches!(
                store.add_box(t, "a.mp4", bbox("car")),
                Err(StoreError::InvalidTimestamp(_))
            ));
        }
        assert_eq!(store.list(), before.as_slice());
        assert!(!store.is_dirty());

        assert!(store.add_box(0.0, "a.mp4", bbox("car")).is_ok());
    }

    #[test]
    fn test_query_window() {
        let mut store = AnnotationStore::new();
        store.load(&sample_collection(), "a.mp4");

        assert_eq!(store.query(1.09).count(), 1);
        assert_eq!(store.query(1.2).count(), 0);
        assert_eq!(store.find_bucket(0.95), Some(0));
    }
}
