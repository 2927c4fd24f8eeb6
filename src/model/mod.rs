//! Data models for VBAT.

mod annotation;
mod geometry;

pub use annotation::{
    AnnotationBox, AnnotationCollection, AnnotationEntry, LabelVocabulary, Shape,
};
pub use geometry::{Point, Rect, Size};
