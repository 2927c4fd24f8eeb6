//! Error types for the annotation core.

use thiserror::Error;

/// Errors from editing the working subset.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No entry at the given position
    #[error("Entry {index} not found ({len} entries)")]
    EntryNotFound {
        /// Requested entry index
        index: usize,
        /// Number of entries in the working subset
        len: usize,
    },

    /// Entry exists but has no box at the given position
    #[error("Box {index} not found in entry {entry} ({len} boxes)")]
    BoxNotFound {
        /// Entry index
        entry: usize,
        /// Requested box index
        index: usize,
        /// Number of boxes in that entry
        len: usize,
    },

    /// Timestamps must be finite and not negative
    #[error("Invalid timestamp {0}")]
    InvalidTimestamp(f64),
}

/// Errors from the annotation store collaborator (load/save transport).
#[derive(Error, Debug)]
pub enum BackendError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The store could not be reached or refused the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the coordinating session.
#[derive(Error, Debug)]
pub enum SessionError {
    /// A save was requested while a previous one is still pending
    #[error("A save is already in progress")]
    SaveInFlight,

    /// No video has been selected yet
    #[error("No video selected")]
    NoVideoSelected,

    /// A save completion arrived for a request that is not pending
    #[error("Unknown save request {0}")]
    UnknownSaveRequest(u64),

    /// A drawn box is still waiting for its label
    #[error("A label is still pending for the last drawn box")]
    LabelPending,

    /// Editing the working subset failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Transport failure while talking to the store
    #[error(transparent)]
    Backend(#[from] BackendError),
}
