//! Annotation records: boxes, per-timestamp entries and the full collection.
//!
//! The serialized form matches the annotation file written by the store:
//! a bare JSON array of entries, each entry carrying its boxes under the
//! `annotations` key and each box tagged with a `type` field.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::geometry::Rect;

/// Shape geometry of a box, in source-video pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Axis-aligned bounding box.
    Bbox {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// Horizontal marker line spanning the whole frame.
    WaterLevel { y: f64 },
}

impl Shape {
    pub fn from_rect(rect: Rect) -> Self {
        Shape::Bbox {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }

    /// The rectangle of a bounding box, `None` for other shapes.
    pub fn as_rect(&self) -> Option<Rect> {
        match *self {
            Shape::Bbox {
                x,
                y,
                width,
                height,
            } => Some(Rect::new(x, y, width, height)),
            Shape::WaterLevel { .. } => None,
        }
    }
}

/// A labelled shape inside an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationBox {
    #[serde(flatten)]
    pub shape: Shape,
    /// Free-text label. Boxes from other tools may omit it.
    #[serde(default)]
    pub label: String,
}

impl AnnotationBox {
    /// Create a bounding box in source space.
    pub fn bbox(rect: Rect, label: impl Into<String>) -> Self {
        Self {
            shape: Shape::from_rect(rect),
            label: label.into(),
        }
    }

    pub fn water_level(y: f64, label: impl Into<String>) -> Self {
        Self {
            shape: Shape::WaterLevel { y },
            label: label.into(),
        }
    }

    pub fn has_label(&self) -> bool {
        !self.label.is_empty()
    }
}

/// All boxes visible at one instant of one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationEntry {
    /// Video identifier (file name).
    pub video: String,
    /// Playback position in seconds.
    pub timestamp: f64,
    #[serde(rename = "annotations", default)]
    pub boxes: Vec<AnnotationBox>,
}

impl AnnotationEntry {
    /// Create an empty entry.
    pub fn new(video: impl Into<String>, timestamp: f64) -> Self {
        Self {
            video: video.into(),
            timestamp,
            boxes: Vec::new(),
        }
    }

    pub fn with_box(mut self, annotation: AnnotationBox) -> Self {
        self.boxes.push(annotation);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// Every entry across all videos, in file order.
///
/// Uniqueness per (video, bucket) is not enforced here; it is maintained by
/// the reconciliation logic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationCollection {
    entries: Vec<AnnotationEntry>,
}

impl AnnotationCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[AnnotationEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnnotationEntry> {
        self.entries.iter()
    }

    pub fn push(&mut self, entry: AnnotationEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries belonging to one video, in collection order.
    pub fn for_video<'a>(&'a self, video: &'a str) -> impl Iterator<Item = &'a AnnotationEntry> {
        self.entries.iter().filter(move |e| e.video == video)
    }

    /// Distinct video identifiers, sorted.
    pub fn videos(&self) -> BTreeSet<&str> {
        self.entries.iter().map(|e| e.video.as_str()).collect()
    }

    /// Box count across every entry.
    pub fn total_boxes(&self) -> usize {
        self.entries.iter().map(|e| e.boxes.len()).sum()
    }
}

impl From<Vec<AnnotationEntry>> for AnnotationCollection {
    fn from(entries: Vec<AnnotationEntry>) -> Self {
        Self { entries }
    }
}

impl FromIterator<AnnotationEntry> for AnnotationCollection {
    fn from_iter<I: IntoIterator<Item = AnnotationEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a AnnotationCollection {
    type Item = &'a AnnotationEntry;
    type IntoIter = std::slice::Iter<'a, AnnotationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Distinct labels seen across a collection, used for label suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelVocabulary {
    labels: BTreeSet<String>,
}

impl LabelVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a label. Empty labels are ignored.
    pub fn insert(&mut self, label: &str) -> bool {
        if label.is_empty() {
            return false;
        }
        self.labels.insert(label.to_string())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Labels in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
