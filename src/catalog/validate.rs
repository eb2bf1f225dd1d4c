// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use crate::error::FolderError;

/// Audio extensions accepted for an episode, with the media type announced in the feed
const AUDIO_TYPES: [(&str, &str); 6] = [
    ("m4a", "audio/x-m4a"),
    ("mp3", "audio/mpeg"),
    ("aac", "audio/aac"),
    ("ogg", "audio/ogg"),
    ("oga", "audio/ogg"),
    ("opus", "audio/opus"),
];

const METADATA_EXTENSIONS: [&str; 1] = ["json"];

const ARTWORK_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// The files that make a folder a complete episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderContents {
    pub audio_file: String,
    pub metadata_file: String,
    /// Per-episode artwork, if the folder has one
    pub artwork_file: Option<String>,
}

/// Get the media type for an audio file name, if the extension is recognized
pub fn audio_mime_type(filename: &str) -> Option<&'static str> {
    let ext = extension_of(filename)?;
    AUDIO_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn has_extension(filename: &str, known: &[&str]) -> bool {
    extension_of(filename).is_some_and(|ext| known.contains(&ext.as_str()))
}

/// Check whether a folder currently holds an audio file and a metadata file
///
/// Only immediate entries are considered; hidden files and subdirectories are
/// skipped. `Ok(None)` means "not a complete episode yet", which is distinct
/// from a failure to list the folder.
pub fn validate_folder(folder: &Path) -> Result<Option<FolderContents>, FolderError> {
    let read_failed = |e| FolderError::ReadDirectoryFailed {
        path: folder.to_path_buf(),
        source: e,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(folder).map_err(read_failed)? {
        let entry = entry.map_err(read_failed)?;

        // Entries may vanish between listing and stat while a writer is busy
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }

        if let Some(name) = entry.file_name().to_str()
            && !name.starts_with('.')
        {
            names.push(name.to_string());
        }
    }

    // read_dir order is platform dependent
    names.sort();

    let audio_file = names.iter().find(|n| audio_mime_type(n).is_some());
    let metadata_file = names
        .iter()
        .find(|n| has_extension(n, &METADATA_EXTENSIONS));

    let (Some(audio_file), Some(metadata_file)) = (audio_file, metadata_file) else {
        return Ok(None);
    };

    let artwork_file = names
        .iter()
        .find(|n| has_extension(n, &ARTWORK_EXTENSIONS))
        .cloned();

    Ok(Some(FolderContents {
        audio_file: audio_file.clone(),
        metadata_file: metadata_file.clone(),
        artwork_file,
    }))
}
