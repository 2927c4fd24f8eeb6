//! YOLO TXT dataset export.
//!
//! Each annotated (video, timestamp) pair becomes one frame of the dataset.
//! Its labels go to `labels/<frame>.txt` with one line per box:
//! `<class_id> <x_center> <y_center> <width> <height>`, normalized to the
//! frame size. The frame images themselves are not decoded here; the export
//! result lists the frames an external decoder has to write into `images/`.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::format::error::FormatError;
use crate::format::result::{ExportResult, FormatWarning, FrameRequest};
use crate::model::{AnnotationCollection, AnnotationEntry, Shape};

/// Height used for water-level lines, normalized.
const WATER_LEVEL_HEIGHT: f64 = 0.001;

/// Ordered class list; the class id of a label is its index.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ClassConfig {
    pub names: Vec<String>,
}

#[derive(Deserialize)]
struct RawClassConfig {
    names: Option<Vec<String>>,
}

impl ClassConfig {
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse `{"names": [...]}`.
    pub fn from_json(json: &str) -> Result<Self, FormatError> {
        let raw: RawClassConfig = serde_json::from_str(json)?;
        let names = raw
            .names
            .ok_or_else(|| FormatError::invalid_format("class config needs a 'names' list"))?;
        Ok(Self { names })
    }

    pub fn load(path: &Path) -> Result<Self, FormatError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded {} classes from {:?}", config.names.len(), path);
        Ok(config)
    }

    pub fn class_id(&self, label: &str) -> Option<usize> {
        self.names.iter().position(|n| n == label)
    }
}

/// Frame geometry and rate of one video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

impl VideoInfo {
    pub fn new(width: u32, height: u32, fps: f64) -> Self {
        Self { width, height, fps }
    }

    /// Frame shown at `timestamp`.
    pub fn frame_number(&self, timestamp: f64) -> u64 {
        (timestamp * self.fps).max(0.0) as u64
    }
}

/// Base name for the frame of `video` at `timestamp`:
/// `<stem>_<whole seconds>_<hundredths>`.
pub fn frame_basename(video: &str, timestamp: f64) -> String {
    let stem = Path::new(video)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(video);
    let whole = timestamp.trunc();
    let hundredths = ((timestamp - whole) * 100.0) as u64;
    format!("{}_{}_{}", stem, whole as u64, hundredths)
}

/// YOLO exporter for a fixed class list.
#[derive(Debug, Clone)]
pub struct YoloExporter {
    classes: ClassConfig,
}

impl YoloExporter {
    pub fn new(classes: ClassConfig) -> Self {
        Self { classes }
    }

    pub fn classes(&self) -> &ClassConfig {
        &self.classes
    }

    /// Label lines for one entry. Boxes with unknown labels are skipped and
    /// reported through `warnings`.
    pub fn label_lines(
        &self,
        entry: &AnnotationEntry,
        info: &VideoInfo,
        warnings: &mut Vec<FormatWarning>,
    ) -> Vec<String> {
        let width = f64::from(info.width);
        let height = f64::from(info.height);
        let mut lines = Vec::new();

        for annotation in &entry.boxes {
            let Some(class_id) = self.classes.class_id(&annotation.label) else {
                warnings.push(FormatWarning::skipped_box(
                    &entry.video,
                    format!(
                        "Label '{}' is not in the class list, skipping box",
                        annotation.label
                    ),
                ));
                continue;
            };

            let (cx, cy, nw, nh) = match annotation.shape {
                Shape::Bbox {
                    x,
                    y,
                    width: w,
                    height: h,
                } => (
                    (x + w / 2.0) / width,
                    (y + h / 2.0) / height,
                    w / width,
                    h / height,
                ),
                Shape::WaterLevel { y } => (0.5, y / height, 1.0, WATER_LEVEL_HEIGHT),
            };

            lines.push(format!(
                "{} {:.6} {:.6} {:.6} {:.6}",
                class_id, cx, cy, nw, nh
            ));
        }

        lines
    }

    /// Write label files for every annotated frame under `out_dir`.
    ///
    /// `videos` supplies frame size and rate per video; entries of videos
    /// without usable info are skipped with a warning. Repeated
    /// (video, timestamp) pairs are exported once.
    pub fn export(
        &self,
        collection: &AnnotationCollection,
        videos: &HashMap<String, VideoInfo>,
        out_dir: &Path,
    ) -> Result<ExportResult, FormatError> {
        log::info!("Exporting YOLO dataset to {:?}", out_dir);

        let images_dir = out_dir.join("images");
        let labels_dir = out_dir.join("labels");
        std::fs::create_dir_all(&images_dir)?;
        std::fs::create_dir_all(&labels_dir)?;

        let mut result = ExportResult::default();
        let mut seen: HashSet<(&str, u64)> = HashSet::new();

        for entry in collection {
            if !seen.insert((entry.video.as_str(), entry.timestamp.to_bits())) {
                continue;
            }

            let info = match videos.get(&entry.video) {
                Some(info) if info.width > 0 && info.height > 0 => info,
                _ => {
                    result.warnings.push(FormatWarning::skipped_frame(
                        &entry.video,
                        format!("No frame size known, skipping {:.2}s", entry.timestamp),
                    ));
                    continue;
                }
            };

            let base = frame_basename(&entry.video, entry.timestamp);
            result.frames.push(FrameRequest {
                video: entry.video.clone(),
                timestamp: entry.timestamp,
                frame_number: info.frame_number(entry.timestamp),
                image_name: format!("{}.jpg", base),
            });
            result.frames_exported += 1;

            let lines = self.label_lines(entry, info, &mut result.warnings);
            if lines.is_empty() {
                continue;
            }

            let label_path = labels_dir.join(format!("{}.txt", base));
            std::fs::write(&label_path, lines.join("\n"))?;
            result.annotations_exported += lines.len();
            result.files_created.push(label_path);
            log::debug!(
                "Wrote {} labels for {} at {:.2}s",
                lines.len(),
                entry.video,
                entry.timestamp
            );
        }

        log::info!(
            "Exported {} frames with {} annotations ({} warnings)",
            result.frames_exported,
            result.annotations_exported,
            result.warnings.len()
        );

        Ok(result)
    }
}
