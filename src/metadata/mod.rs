mod date;
mod episode;
mod show;

pub use date::parse_pub_date;
pub use episode::{EpisodeMetadata, read_episode_metadata};
pub use show::{SHOW_METADATA_FILENAME, ShowDescriptor, ShowOwner, read_show_descriptor};
