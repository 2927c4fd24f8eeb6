//! Timestamped copies of the annotation file.

use std::path::{Path, PathBuf};

use crate::format::error::FormatError;

/// Copy `file` into `backup_dir` as `annotations_YYYYmmdd_HHMMSS.json`.
///
/// Returns `Ok(None)` if there is nothing to back up.
pub fn backup_annotations(file: &Path, backup_dir: &Path) -> Result<Option<PathBuf>, FormatError> {
    if !file.exists() {
        log::warn!("⚠️ {:?} not found, skipping backup", file);
        return Ok(None);
    }

    std::fs::create_dir_all(backup_dir)?;
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let destination = backup_dir.join(format!("annotations_{}.json", stamp));
    std::fs::copy(file, &destination)?;

    log::info!("🗄️ Backed up {:?} to {:?}", file, destination);
    Ok(Some(destination))
}
