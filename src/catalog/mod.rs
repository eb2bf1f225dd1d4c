mod record;
mod store;
mod validate;

pub use record::{EpisodeRecord, MediaLocator, MediaReference};
pub use store::{EpisodeStore, Snapshot};
pub use validate::{FolderContents, audio_mime_type, validate_folder};
