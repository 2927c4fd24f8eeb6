//! VBAT - Video Bounding-box Annotation Tool
//!
//! Core of a frame-accurate video annotator: boxes drawn over a scaled
//! playback surface are mapped into source pixels, grouped into time
//! buckets per video, and merged back into one persisted collection.

pub mod backend;
pub mod config;
pub mod constants;
pub mod coords;
pub mod draw;
pub mod error;
pub mod format;
pub mod model;
pub mod reconcile;
pub mod session;
pub mod store;
pub mod timeline;

pub use backend::{AnnotationBackend, JsonFileBackend, PlaybackSurface};
pub use config::AppConfig;
pub use coords::CoordinateMapper;
pub use draw::DrawSession;
pub use error::{BackendError, SessionError, StoreError};
pub use model::{AnnotationBox, AnnotationCollection, AnnotationEntry, Shape};
pub use reconcile::ReconciliationEngine;
pub use session::AnnotatorSession;
pub use store::AnnotationStore;
pub use timeline::TimeBucketIndex;
