//! Timestamp bucketing for annotation entries.
//!
//! Playback positions reported by a video element are never exact, so two
//! boxes drawn "on the same frame" rarely share a timestamp. Entries whose
//! timestamps differ by less than the bucket epsilon are treated as one
//! bucket.

use crate::constants::BUCKET_EPSILON;
use crate::model::AnnotationEntry;

/// Locates and creates per-timestamp buckets in a timestamp-sorted sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeBucketIndex {
    epsilon: f64,
}

impl Default for TimeBucketIndex {
    fn default() -> Self {
        Self {
            epsilon: BUCKET_EPSILON,
        }
    }
}

impl TimeBucketIndex {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Whether two timestamps fall into the same bucket.
    #[inline]
    pub fn same_bucket(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.epsilon
    }

    /// Index of the first entry within epsilon of `t`.
    ///
    /// If several entries match (only possible with unnormalized data) the
    /// first one in sequence order wins.
    pub fn find_bucket(&self, entries: &[AnnotationEntry], t: f64) -> Option<usize> {
        entries.iter().position(|e| self.same_bucket(e.timestamp, t))
    }

    /// Index of the bucket for `(video, t)`, inserting an empty entry at
    /// exactly `t` if none exists.
    ///
    /// New entries are inserted after every entry with a timestamp `<= t`,
    /// so a sorted sequence stays sorted.
    pub fn find_or_create(&self, entries: &mut Vec<AnnotationEntry>, t: f64, video: &str) -> usize {
        if let Some(idx) = entries
            .iter()
            .position(|e| e.video == video && self.same_bucket(e.timestamp, t))
        {
            return idx;
        }

        let idx = entries.partition_point(|e| e.timestamp <= t);
        entries.insert(idx, AnnotationEntry::new(video, t));
        log::trace!("New bucket for {} at {:.3}s (index {})", video, t, idx);
        idx
    }

    /// Collapse entries that share a (video, bucket) into the first of them.
    ///
    /// Boxes of later duplicates are appended in sequence order and the
    /// surviving entry keeps its own timestamp. Returns the collapsed
    /// entries and the number of duplicates that were folded in.
    pub fn collapse_duplicates(
        &self,
        entries: impl IntoIterator<Item = AnnotationEntry>,
    ) -> (Vec<AnnotationEntry>, usize) {
        let mut out: Vec<AnnotationEntry> = Vec::new();
        let mut folded = 0;

        for entry in entries {
            match out
                .iter_mut()
                .find(|e| e.video == entry.video && self.same_bucket(e.timestamp, entry.timestamp))
            {
                Some(existing) => {
                    existing.boxes.extend(entry.boxes);
                    folded += 1;
                }
                None => out.push(entry),
            }
        }

        (out, folded)
    }

    /// Entries within epsilon of `t`, in sequence order.
    pub fn window<'a>(
        &self,
        entries: &'a [AnnotationEntry],
        t: f64,
    ) -> impl Iterator<Item = &'a AnnotationEntry> {
        let index = *self;
        entries
            .iter()
            .filter(move |e| index.same_bucket(e.timestamp, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries_at(times: &[f64]) -> Vec<AnnotationEntry> {
        times
            .iter()
            .map(|&t| AnnotationEntry::new("a.mp4", t))
            .collect()
    }

    #[test]
    fn test_find_bucket_within_epsilon() {
        let index = TimeBucketIndex::default();
        let entries = entries_at(&[1.0, 2.0]);

        assert_eq!(index.find_bucket(&entries, 1.05), Some(0));
        assert_eq!(index.find_bucket(&entries, 1.95), Some(1));
        assert_eq!(index.find_bucket(&entries, 1.5), None);
    }

    #[test]
    fn test_bucket_window_is_open() {
        let index = TimeBucketIndex::new(0.25);
        assert_eq!(index.epsilon(), 0.25);
        let entries = entries_at(&[2.0]);
        assert_eq!(index.find_bucket(&entries, 2.125), Some(0));
        assert_eq!(index.find_bucket(&entries, 2.25), None);
        assert_eq!(index.find_bucket(&entries, 1.75), None);
    }

    #[test]
    fn test_find_bucket_prefers_first_match() {
        let index = TimeBucketIndex::default();
        let entries = entries_at(&[1.0, 1.08]);
        assert_eq!(index.find_bucket(&entries, 1.04), Some(0));
    }

    #[test]
    fn test_find_or_create_is_idempotent_within_window() {
        let index = TimeBucketIndex::default();
        let mut entries = Vec::new();

        let first = index.find_or_create(&mut entries, 4.00, "a.mp4");
        let second = index.find_or_create(&mut entries, 4.07, "a.mp4");
        assert_eq!(first, second);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].timestamp, 4.00);
    }

    #[test]
    fn test_find_or_create_keeps_order() {
        let index = TimeBucketIndex::default();
        let mut entries = entries_at(&[1.0, 3.0]);

        let idx = index.find_or_create(&mut entries, 2.0, "a.mp4");
        assert_eq!(idx, 1);
        let times: Vec<f64> = entries.iter().map(|e| e.timestamp).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);

        let idx = index.find_or_create(&mut entries, 0.2, "a.mp4");
        assert_eq!(idx, 0);
        let idx = index.find_or_create(&mut entries, 9.0, "a.mp4");
        assert_eq!(idx, entries.len() - 1);
    }

    #[test]
    fn test_find_or_create_respects_video() {
        let index = TimeBucketIndex::default();
        let mut entries = entries_at(&[1.0]);

        let idx = index.find_or_create(&mut entries, 1.0, "b.mp4");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[idx].video, "b.mp4");
    }

    #[test]
    fn test_collapse_duplicates() {
        use crate::model::{AnnotationBox, Rect};

        let index = TimeBucketIndex::default();
        let boxed = |video: &str, t: f64, label: &str| {
            AnnotationEntry::new(video, t).with_box(AnnotationBox::bbox(Rect::default(), label))
        };
        let input = vec![
            boxed("a.mp4", 1.0, "first"),
            boxed("b.mp4", 1.0, "other"),
            boxed("a.mp4", 1.04, "second"),
            boxed("a.mp4", 5.0, "later"),
        ];

        let (out, folded) = index.collapse_duplicates(input);
        assert_eq!(folded, 1);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].timestamp, 1.0);
        let labels: Vec<&str> = out[0].boxes.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["first", "second"]);
        assert_eq!(out[1].video, "b.mp4");
    }

    #[test]
    fn test_window() {
        let index = TimeBucketIndex::new(0.5);
        let entries = entries_at(&[1.0, 1.4, 2.0]);
        let hits: Vec<f64> = index.window(&entries, 1.2).map(|e| e.timestamp).collect();
        assert_eq!(hits, vec![1.0, 1.4]);
    }
}
