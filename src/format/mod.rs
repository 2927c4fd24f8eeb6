//! Dataset export.
//!
//! Turns the annotation collection into a YOLO training set. Frames are
//! named after their video and timestamp; the class list comes from a
//! `class_config.json` with a `names` array.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vbat::format::{ClassConfig, YoloExporter};
//!
//! let exporter = YoloExporter::new(ClassConfig::load(path)?);
//! let result = exporter.export(&collection, &video_info, out_dir)?;
//! ```

mod backup;
mod error;
mod result;
mod yolo;

#[cfg(test)]
mod tests;

pub use backup::backup_annotations;
pub use error::FormatError;
pub use result::{ExportResult, FormatWarning, FrameRequest, WarningSeverity};
pub use yolo::{ClassConfig, VideoInfo, YoloExporter, frame_basename};
