//! External collaborators: the annotation store and the playback surface.

mod json_file;
mod memory;
mod traits;
mod videos;

pub use json_file::{JsonFileBackend, to_pretty_json};
pub use memory::InMemoryBackend;
pub use traits::{AnnotationBackend, FixedPlayback, PlaybackSurface, SaveReceipt};
pub use videos::{is_video_filename, list_videos};
