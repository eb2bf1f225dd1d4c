// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use tracing::{debug, warn};

use crate::catalog::{EpisodeStore, MediaLocator};
use crate::error::StartupError;
use crate::report::{CatalogEvent, SharedReporter};

use super::attempt_admission;

/// Result of the startup scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Folders admitted into the store
    pub admitted: usize,
    /// Folders that were incomplete or failed to load
    pub skipped: usize,
}

/// Admit every complete episode folder already present under `root`
///
/// Each subdirectory gets a single attempt; folders are assumed to be fully
/// written at startup. A bad folder is logged and skipped without affecting
/// the others. Only a failure to list `root` itself is an error.
pub fn scan_root(
    root: &Path,
    store: &EpisodeStore,
    locator: &MediaLocator,
    reporter: &SharedReporter,
) -> Result<ScanSummary, StartupError> {
    if !root.is_dir() {
        return Err(StartupError::RootNotFound(root.to_path_buf()));
    }

    let read_failed = |e| StartupError::ReadRootFailed {
        path: root.to_path_buf(),
        source: e,
    };

    let mut keys = Vec::new();
    for entry in std::fs::read_dir(root).map_err(read_failed)? {
        let entry = entry.map_err(read_failed)?;
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(key) => keys.push(key),
            Err(name) => warn!(?name, "Skipping folder with a non UTF-8 name"),
        }
    }
    keys.sort();

    let mut summary = ScanSummary::default();
    for key in keys {
        match attempt_admission(root, &key, locator) {
            Ok(Some(record)) => {
                let title = record.title.clone();
                store.upsert(&key, record);
                summary.admitted += 1;
                reporter.report(CatalogEvent::EpisodeAdmitted { key, title });
            }
            Ok(None) => {
                debug!(%key, "Folder is missing its audio or metadata file, skipping");
                summary.skipped += 1;
            }
            Err(e) => {
                warn!(%key, error = %e, "Failed to load episode folder, skipping");
                summary.skipped += 1;
            }
        }
    }

    reporter.report(CatalogEvent::ScanCompleted {
        admitted_count: summary.admitted,
        skipped_count: summary.skipped,
    });

    Ok(summary)
}
