//! Global constants for the VBAT annotation core

/// Timestamps closer than this (in seconds) share one bucket.
pub const BUCKET_EPSILON: f64 = 0.1;

/// Minimum width and height (display pixels) for a drawn box to be kept.
pub const MIN_BOX_SIZE: f64 = 5.0;

/// Video file extensions offered for annotation.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi"];

/// Default annotation file name, relative to the working directory.
pub const DEFAULT_ANNOTATIONS_FILE: &str = "annotations.json";

/// Default folder holding the videos.
pub const DEFAULT_VIDEO_FOLDER: &str = "uploads";

/// Default class configuration file used by dataset export.
pub const DEFAULT_CLASS_CONFIG_FILE: &str = "class_config.json";

/// Default folder for timestamped annotation backups.
pub const DEFAULT_BACKUP_FOLDER: &str = "backups/annotations";

/// Message returned by file-backed stores after a successful save.
pub const SAVE_SUCCESS_MESSAGE: &str = "Annotations saved successfully.";
