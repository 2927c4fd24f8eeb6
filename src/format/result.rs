//! What an export produced and what it had to skip.

use std::path::PathBuf;

/// A frame an external decoder must extract to pair with exported labels.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRequest {
    pub video: String,
    pub timestamp: f64,
    /// `floor(timestamp * fps)`.
    pub frame_number: u64,
    /// File name the extracted image should be written as.
    pub image_name: String,
}

#[derive(Debug, Default)]
pub struct ExportResult {
    pub frames_exported: usize,
    /// Boxes written as label lines.
    pub annotations_exported: usize,
    pub warnings: Vec<FormatWarning>,
    /// Label files written.
    pub files_created: Vec<PathBuf>,
    /// Frames to extract into `images/`.
    pub frames: Vec<FrameRequest>,
}

impl ExportResult {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Whether a whole frame had to be left out.
    pub fn has_errors(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| w.severity == WarningSeverity::Error)
    }
}

/// Something the exporter skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatWarning {
    pub video: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl FormatWarning {
    /// A single box was left out.
    pub fn skipped_box(video: &str, message: impl Into<String>) -> Self {
        Self {
            video: video.to_string(),
            message: message.into(),
            severity: WarningSeverity::Warning,
        }
    }

    /// A whole frame was left out.
    pub fn skipped_frame(video: &str, message: impl Into<String>) -> Self {
        Self {
            video: video.to_string(),
            message: message.into(),
            severity: WarningSeverity::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Warning,
    Error,
}
