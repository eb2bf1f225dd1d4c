// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod catalog;
pub mod error;
pub mod feed;
pub mod metadata;
pub mod reconcile;
pub mod report;
pub mod server;

// Re-export main types for convenience
pub use catalog::{EpisodeRecord, EpisodeStore, MediaLocator, Snapshot, validate_folder};
pub use error::{AdmissionError, FeedError, FolderError, MetadataError, StartupError, WatchError};
pub use feed::{project, render_feed};
pub use metadata::{ShowDescriptor, read_episode_metadata, read_show_descriptor};
pub use reconcile::{
    FolderWatcher, FsEvent, Outcome, Reaction, Reconciler, RetryPolicy, ScanSummary, scan_root,
};
pub use report::{CatalogEvent, CatalogReporter, NoopReporter, SharedReporter, TracingReporter};
pub use server::{AppState, router};
