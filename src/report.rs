// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use tracing::{debug, info, warn};

/// Why a pending folder stopped being validated without being admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbandonReason {
    /// The required files did not both appear within the retry window
    TimedOut,
    /// The metadata file could not be read or parsed
    MalformedMetadata,
}

/// Events emitted while the catalog follows the watched directory
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    /// A new directory appeared and is being validated
    FolderDetected { key: String },

    /// A validation attempt found the folder incomplete
    FolderIncomplete { key: String },

    /// A validation attempt could not list the folder
    FolderUnreadable { key: String, error: String },

    /// An episode became visible in the catalog
    EpisodeAdmitted { key: String, title: String },

    /// A folder will not be admitted until it is announced again
    FolderAbandoned {
        key: String,
        reason: AbandonReason,
        error: Option<String>,
    },

    /// A removal notification was applied
    EpisodeRemoved { key: String, was_present: bool },

    /// The startup scan finished
    ScanCompleted {
        admitted_count: usize,
        skipped_count: usize,
    },
}

/// Trait for observing catalog changes.
///
/// Implementations can log events, collect them for tests, or forward them
/// elsewhere.
pub trait CatalogReporter: Send + Sync {
    /// Report a catalog event
    fn report(&self, event: CatalogEvent);
}

/// A shared reference to a catalog reporter
pub type SharedReporter = Arc<dyn CatalogReporter>;

/// A reporter that writes every event to the `tracing` subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl TracingReporter {
    pub fn shared() -> SharedReporter {
        Arc::new(Self)
    }
}

impl CatalogReporter for TracingReporter {
    fn report(&self, event: CatalogEvent) {
        match event {
            CatalogEvent::FolderDetected { key } => {
                info!(%key, "New folder detected");
            }
            CatalogEvent::FolderIncomplete { key } => {
                debug!(%key, "Not all the necessary files are present yet");
            }
            CatalogEvent::FolderUnreadable { key, error } => {
                debug!(%key, %error, "Folder could not be listed, will retry");
            }
            CatalogEvent::EpisodeAdmitted { key, title } => {
                info!(%key, %title, "Episode added to feed");
            }
            CatalogEvent::FolderAbandoned { key, reason, error } => match error {
                Some(error) => warn!(%key, ?reason, %error, "Folder not admitted"),
                None => warn!(%key, ?reason, "Folder not admitted"),
            },
            CatalogEvent::EpisodeRemoved { key, was_present } => {
                if was_present {
                    info!(%key, "Episode removed from feed");
                } else {
                    debug!(%key, "Deleted item was not in the feed");
                }
            }
            CatalogEvent::ScanCompleted {
                admitted_count,
                skipped_count,
            } => {
                info!(admitted_count, skipped_count, "Startup scan complete");
            }
        }
    }
}

/// A reporter that silently ignores all events.
/// Useful for tests or embedding.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl CatalogReporter for NoopReporter {
    fn report(&self, _event: CatalogEvent) {
        // Intentionally empty
    }
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedReporter {
        Arc::new(Self)
    }
}
