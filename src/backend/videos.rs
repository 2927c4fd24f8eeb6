//! Discovery of annotatable videos in a folder.

use std::path::Path;

use crate::constants::VIDEO_EXTENSIONS;
use crate::error::BackendError;

/// Check if a file name has a supported video extension (case-insensitive).
pub fn is_video_filename(name: &str) -> bool {
    let lower = name.to_lowercase();
    VIDEO_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}

/// Sorted file names of the videos directly inside `folder`.
///
/// A missing folder yields an empty list with a warning.
pub fn list_videos(folder: &Path) -> Result<Vec<String>, BackendError> {
    let read_dir = match std::fs::read_dir(folder) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("⚠️ Video folder {:?} not found", folder);
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut videos = Vec::new();
    for entry in read_dir {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if is_video_filename(name) {
                videos.push(name.to_string());
            }
        }
    }
    videos.sort();

    log::debug!("🎞️ Found {} videos in {:?}", videos.len(), folder);
    Ok(videos)
}
