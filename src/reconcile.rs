//! Reconciliation between the full multi-video collection and the working
//! subset of one video.
//!
//! Saving is a replace-by-video operation: every entry of the active video
//! is dropped from the full collection and the working subset is appended.
//! Two sessions saving the same video therefore overwrite each other; the
//! last save wins.

use crate::model::{AnnotationCollection, AnnotationEntry, LabelVocabulary};
use crate::store::AnnotationStore;
use crate::timeline::TimeBucketIndex;

/// Replace all entries of `video` in `full` with `working`.
///
/// Entries of other videos keep their order and contents. Working entries
/// without boxes are pruned.
pub fn merge(
    full: &AnnotationCollection,
    video: &str,
    working: &[AnnotationEntry],
) -> AnnotationCollection {
    full.iter()
        .filter(|e| e.video != video)
        .cloned()
        .chain(working.iter().filter(|e| !e.is_empty()).cloned())
        .collect()
}

/// Every distinct non-empty label in the collection.
pub fn rebuild_vocabulary(full: &AnnotationCollection) -> LabelVocabulary {
    let mut vocabulary = LabelVocabulary::new();
    for entry in full {
        for annotation in &entry.boxes {
            vocabulary.insert(&annotation.label);
        }
    }
    vocabulary
}

/// Collapse duplicate (video, bucket) entries across the whole collection.
///
/// Returns the normalized collection and how many entries were folded.
pub fn normalize_buckets(
    full: &AnnotationCollection,
    index: TimeBucketIndex,
) -> (AnnotationCollection, usize) {
    let (entries, folded) = index.collapse_duplicates(full.iter().cloned());
    (entries.into(), folded)
}

/// Owns the last-known-good collection and the vocabulary derived from it.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationEngine {
    collection: AnnotationCollection,
    vocabulary: LabelVocabulary,
    index: TimeBucketIndex,
}

impl ReconciliationEngine {
    pub fn new(index: TimeBucketIndex) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Adopt a freshly loaded or freshly persisted collection.
    pub fn install(&mut self, collection: AnnotationCollection) {
        self.vocabulary = rebuild_vocabulary(&collection);
        log::debug!(
            "📚 Installed {} entries across {} videos ({} labels)",
            collection.len(),
            collection.videos().len(),
            self.vocabulary.len()
        );
        self.collection = collection;
    }

    /// Build a working subset for `video`.
    pub fn seed(&self, video: &str) -> AnnotationStore {
        let mut store = AnnotationStore::with_index(self.index);
        store.load(self.collection.entries(), video);
        store
    }

    /// Reseed an existing store in place.
    pub fn reseed(&self, store: &mut AnnotationStore, video: &str) {
        store.load(self.collection.entries(), video);
    }

    /// The full collection with `store` merged in, ready to persist.
    ///
    /// The installed collection is not modified; call [`Self::install`]
    /// once the store has accepted the result.
    pub fn commit(&self, store: &AnnotationStore) -> Option<AnnotationCollection> {
        let video = store.video()?;
        Some(merge(&self.collection, video, store.list()))
    }

    pub fn collection(&self) -> &AnnotationCollection {
        &self.collection
    }

    pub fn vocabulary(&self) -> &LabelVocabulary {
        &self.vocabulary
    }

    /// Videos that have at least one entry in the installed collection.
    pub fn videos(&self) -> Vec<&str> {
        self.collection.videos().into_iter().collect()
    }

    pub fn bucket_index(&self) -> TimeBucketIndex {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnotationBox, Rect};

    fn bbox(label: &str) -> AnnotationBox {
        AnnotationBox::bbox(Rect::new(0.0, 0.0, 20.0, 20.0), label)
    }

    fn sample() -> AnnotationCollection {
        vec![
            AnnotationEntry::new("a.mp4", 1.0)
                .with_box(bbox("person"))
                .with_box(bbox("dog")),
            AnnotationEntry::new("b.mp4", 3.0).with_box(bbox("car")),
            AnnotationEntry::new("c.mp4", 0.5).with_box(bbox("")),
        ]
        .into()
    }

    #[test]
    fn test_merge_with_empty_working_drops_video() {
        let full = sample();
        let merged = merge(&full, "a.mp4", &[]);

        assert!(merged.for_video("a.mp4").next().is_none());
        let others: Vec<&AnnotationEntry> = full.iter().filter(|e| e.video != "a.mp4").collect();
        assert_eq!(merged.iter().collect::<Vec<_>>(), others);
    }

    #[test]
    fn test_merge_replaces_video_entries() {
        let full = sample();
        let working = vec![
            AnnotationEntry::new("a.mp4", 2.0).with_box(bbox("cat")),
            AnnotationEntry::new("a.mp4", 4.0),
        ];
        let merged = merge(&full, "a.mp4", &working);

        let a: Vec<&AnnotationEntry> = merged.for_video("a.mp4").collect();
        assert_eq!(a.len(), 1, "empty entries are pruned");
        assert_eq!(a[0].boxes[0].label, "cat");
        assert_eq!(merged.len(), 3);
        // Working entries are appended after the untouched videos
        assert_eq!(merged.entries()[2].video, "a.mp4");
    }

    #[test]
    fn test_vocabulary_excludes_empty_labels() {
        let vocab = rebuild_vocabulary(&sample());
        assert_eq!(vocab.iter().collect::<Vec<_>>(), vec!["car", "dog", "person"]);
    }

    #[test]
    fn test_normalize_buckets() {
        let mut full = sample();
        full.push(AnnotationEntry::new("b.mp4", 3.05).with_box(bbox("truck")));

        let (normalized, folded) = normalize_buckets(&full, TimeBucketIndex::default());
        assert_eq!(folded, 1);
        assert_eq!(normalized.len(), 3);
        assert_eq!(normalized.for_video("b.mp4").next().unwrap().boxes.len(), 2);
    }

    #[test]
    fn test_engine_seed_and_commit() {
        let mut engine = ReconciliationEngine::default();
        engine.install(sample());
        assert!(engine.vocabulary().contains("dog"));
        assert_eq!(engine.videos(), vec!["a.mp4", "b.mp4", "c.mp4"]);

        let mut store = engine.seed("a.mp4");
        store.remove_box(0, 0).unwrap();
        store.remove_box(0, 0).unwrap();

        let merged = engine.commit(&store).unwrap();
        assert_eq!(merged.videos().into_iter().collect::<Vec<_>>(), vec!["b.mp4", "c.mp4"]);
        // Not installed until the store accepts it
        assert_eq!(engine.collection().len(), 3);
    }

    #[test]
    fn test_commit_requires_video() {
        let engine = ReconciliationEngine::default();
        assert!(engine.commit(&AnnotationStore::new()).is_none());
    }
}
