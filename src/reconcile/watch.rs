// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::warn;

use crate::error::WatchError;

/// Capacity of the channel bridging `notify` callbacks to the reconciler
const CHANNEL_CAPACITY: usize = 256;

/// A change to an immediate child of the watched root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsEvent {
    /// Something was created or renamed under this name
    Appeared { name: String },
    /// Something under this name was deleted
    Disappeared { name: String },
}

impl FsEvent {
    pub fn name(&self) -> &str {
        match self {
            FsEvent::Appeared { name } | FsEvent::Disappeared { name } => name,
        }
    }
}

/// Map a raw `notify` event to the changes the reconciler cares about
///
/// A rename produces `Appeared` for every path involved; the reconciler's
/// stat check turns the vanished side into a removal.
pub fn translate_event(root: &Path, event: &notify::Event) -> Vec<FsEvent> {
    let make: fn(String) -> FsEvent = match event.kind {
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(_)) => {
            |name| FsEvent::Appeared { name }
        }
        EventKind::Remove(_) => |name| FsEvent::Disappeared { name },
        _ => return Vec::new(),
    };

    event
        .paths
        .iter()
        .filter(|path| path.parent() == Some(root))
        .filter_map(|path| path.file_name()?.to_str().map(String::from))
        .map(make)
        .collect()
}

/// Non-recursive watch on the episode root.
///
/// Dropping the watcher stops event delivery and closes the channel.
pub struct FolderWatcher {
    root: PathBuf,
    _watcher: RecommendedWatcher,
}

impl FolderWatcher {
    /// Start watching `root`, returning the watcher and its event stream
    pub fn start(root: &Path) -> Result<(Self, mpsc::Receiver<FsEvent>), WatchError> {
        // Backends report canonical paths; compare against the same form
        let root = std::fs::canonicalize(root).map_err(|e| WatchError::Watch {
            path: root.to_path_buf(),
            source: notify::Error::io(e),
        })?;

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        let callback_root = root.clone();
        let mut watcher = notify::recommended_watcher(
            move |res: Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    for change in translate_event(&callback_root, &event) {
                        // Runs on the notify thread, blocking here is fine
                        if tx.blocking_send(change).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => warn!(error = %e, "Filesystem watcher error"),
            },
        )
        .map_err(WatchError::Init)?;

        watcher
            .watch(&root, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::Watch {
                path: root.clone(),
                source: e,
            })?;

        Ok((
            Self {
                root,
                _watcher: watcher,
            },
            rx,
        ))
    }

    /// The canonical path being watched
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use notify::event::{CreateKind, DataChange, RemoveKind, RenameMode};
    use tempfile::tempdir;

    fn event(kind: EventKind, paths: &[&Path]) -> notify::Event {
        paths
            .iter()
            .fold(notify::Event::new(kind), |ev, p| ev.add_path(p.to_path_buf()))
    }

    #[test]
    fn create_becomes_appeared() {
        let root = Path::new("/pod");
        let ev = event(
            EventKind::Create(CreateKind::Folder),
            &[Path::new("/pod/E1")],
        );
        assert_eq!(
            translate_event(root, &ev),
            vec![FsEvent::Appeared {
                name: "E1".to_string()
            }]
        );
    }

    #[test]
    fn remove_becomes_disappeared() {
        let root = Path::new("/pod");
        let ev = event(
            EventKind::Remove(RemoveKind::Folder),
            &[Path::new("/pod/E1")],
        );
        assert_eq!(
            translate_event(root, &ev),
            vec![FsEvent::Disappeared {
                name: "E1".to_string()
            }]
        );
    }

    #[test]
    fn rename_announces_both_sides() {
        let root = Path::new("/pod");
        let ev = event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &[Path::new("/pod/draft"), Path::new("/pod/E1")],
        );
        let names: Vec<_> = translate_event(root, &ev)
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(names, vec!["draft", "E1"]);
    }

    #[test]
    fn content_changes_are_ignored() {
        let root = Path::new("/pod");
        let ev = event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &[Path::new("/pod/E1")],
        );
        assert!(translate_event(root, &ev).is_empty());
    }

    #[test]
    fn nested_paths_are_ignored() {
        let root = Path::new("/pod");
        let ev = event(
            EventKind::Create(CreateKind::File),
            &[Path::new("/pod/E1/episode.m4a"), Path::new("/elsewhere/E2")],
        );
        assert!(translate_event(root, &ev).is_empty());
    }

    #[test]
    fn start_fails_for_missing_root() {
        let dir = tempdir().unwrap();
        let result = FolderWatcher::start(&dir.path().join("missing"));
        assert!(matches!(result, Err(WatchError::Watch { .. })));
    }
}
