//! Annotation store backed by a single JSON file.
//!
//! The file holds the whole collection as a pretty-printed JSON array. A
//! missing or empty file reads as an empty collection. A corrupt file is an
//! error unless the backend was made lenient, in which case it reads as
//! empty with a warning. Saves go through a temporary file in the same
//! directory that is renamed over the target.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::backend::traits::{AnnotationBackend, SaveReceipt};
use crate::constants::SAVE_SUCCESS_MESSAGE;
use crate::error::BackendError;
use crate::model::AnnotationCollection;

/// JSON file store.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
    lenient: bool,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lenient: false,
        }
    }

    /// Read corrupt files as empty instead of failing.
    ///
    /// A session that saves after such a load replaces the whole file, so
    /// only use this for read-only tools.
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with an empty collection if it does not exist.
    ///
    /// Returns true if the file was created.
    pub fn ensure_exists(&self) -> Result<bool, BackendError> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, "[]")?;
        log::info!("📄 Created empty annotation file {:?}", self.path);
        Ok(true)
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

/// Serialize with a four-space indent, leaving non-ASCII text unescaped.
pub fn to_pretty_json(collection: &AnnotationCollection) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    collection.serialize(&mut serializer)?;
    Ok(buf)
}

impl AnnotationBackend for JsonFileBackend {
    fn fetch_all(&self) -> Result<AnnotationCollection, BackendError> {
        if !self.path.exists() {
            log::info!("No annotation file at {:?}, starting empty", self.path);
            return Ok(AnnotationCollection::new());
        }

        let json = std::fs::read_to_string(&self.path)?;
        if json.trim().is_empty() {
            return Ok(AnnotationCollection::new());
        }

        match serde_json::from_str::<AnnotationCollection>(&json) {
            Ok(collection) => {
                log::info!(
                    "📥 Loaded {} entries ({} boxes) from {:?}",
                    collection.len(),
                    collection.total_boxes(),
                    self.path
                );
                Ok(collection)
            }
            Err(e) if self.lenient => {
                log::warn!(
                    "⚠️ Annotation file {:?} is corrupt, reading as empty: {}",
                    self.path,
                    e
                );
                Ok(AnnotationCollection::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&self, collection: &AnnotationCollection) -> Result<SaveReceipt, BackendError> {
        let bytes = to_pretty_json(collection)?;
        let mut tmp = tempfile::NamedTempFile::new_in(self.parent_dir())?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        log::info!(
            "💾 Saved {} entries ({} boxes) to {:?}",
            collection.len(),
            collection.total_boxes(),
            self.path
        );
        Ok(SaveReceipt::new(SAVE_SUCCESS_MESSAGE))
    }
}
