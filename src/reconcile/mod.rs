// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod engine;
mod scan;
mod watch;

use std::path::Path;
use std::time::Duration;

use crate::catalog::{EpisodeRecord, MediaLocator, validate_folder};
use crate::error::AdmissionError;
use crate::metadata::read_episode_metadata;

pub use engine::{Outcome, Reaction, Reconciler};
pub use scan::{ScanSummary, scan_root};
pub use watch::{FolderWatcher, FsEvent, translate_event};

/// Shortest delay the retry ticker accepts
pub const MIN_RETRY_INTERVAL: Duration = Duration::from_millis(1);

/// Options for the bounded validation retry of a newly appeared folder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay between two validation attempts
    pub interval: Duration,
    /// Total time a folder may take to become complete
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay between attempts, never below [`MIN_RETRY_INTERVAL`]
    pub fn tick_interval(&self) -> Duration {
        self.interval.max(MIN_RETRY_INTERVAL)
    }
}

/// Try once to turn the folder `root/key` into an episode record
///
/// Returns `Ok(None)` while the folder is still missing one of its required
/// files. Both the startup scan and the watcher go through here.
pub fn attempt_admission(
    root: &Path,
    key: &str,
    locator: &MediaLocator,
) -> Result<Option<EpisodeRecord>, AdmissionError> {
    let folder = root.join(key);

    let Some(contents) = validate_folder(&folder)? else {
        return Ok(None);
    };

    let metadata = read_episode_metadata(&folder.join(&contents.metadata_file))?;
    let record = EpisodeRecord::build(key, &folder, &contents, metadata, locator)?;

    Ok(Some(record))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::Path;

    use url::Url;

    use crate::catalog::MediaLocator;
    use crate::metadata::ShowDescriptor;

    pub fn locator() -> MediaLocator {
        MediaLocator::new(
            Url::parse("http://localhost:3000/").unwrap(),
            &ShowDescriptor::titled("Show A"),
        )
    }

    pub fn write_audio(folder: &Path) {
        std::fs::create_dir_all(folder).unwrap();
        std::fs::write(folder.join("episode.m4a"), b"audio").unwrap();
    }

    pub fn write_metadata(folder: &Path, title: &str, date: &str) {
        std::fs::create_dir_all(folder).unwrap();
        let json = format!(
            r#"{{"title": "{title}", "description": "About {title}", "pub_date": "{date}", "duration": 120}}"#
        );
        // Rename into place so a concurrent validation never reads a torn file
        let staging = folder.join("episode.json.tmp");
        std::fs::write(&staging, json).unwrap();
        std::fs::rename(&staging, folder.join("episode.json")).unwrap();
    }

    pub fn write_episode(root: &Path, key: &str, date: &str) {
        let folder = root.join(key);
        write_audio(&folder);
        write_metadata(&folder, key, date);
    }
}
