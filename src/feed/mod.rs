mod project;
mod render;

pub use project::project;
pub use render::{render_feed, write_feed};
