// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading show or episode metadata files
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read metadata file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse metadata JSON in {path}: {source}")]
    JsonParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Metadata file {path} has no publish date")]
    MissingPubDate { path: PathBuf },

    #[error("Failed to parse date '{date_str}': {reason}")]
    InvalidDate { date_str: String, reason: String },
}

/// Errors that can occur when listing an episode folder
#[derive(Error, Debug)]
pub enum FolderError {
    #[error("Failed to read directory {path}: {source}")]
    ReadDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from a single attempt to admit a folder into the catalog
#[derive(Error, Debug)]
pub enum AdmissionError {
    #[error("Folder error: {0}")]
    Folder(#[from] FolderError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Cannot build a media URL for '{key}': {reason}")]
    InvalidLocator { key: String, reason: String },
}

impl AdmissionError {
    /// Whether a later attempt could succeed without the folder changing shape
    pub fn is_transient(&self) -> bool {
        matches!(self, AdmissionError::Folder(_))
    }
}

/// Errors that can occur when turning a projected feed into XML
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to serialize RSS feed: {0}")]
    SerializationFailed(#[from] rss::Error),

    #[error("Serialized feed is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Errors that can occur when setting up the filesystem watcher
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to create filesystem watcher: {0}")]
    Init(#[source] notify::Error),

    #[error("Failed to watch {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// Errors that prevent the service from starting
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Watched directory does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("Failed to load show metadata: {0}")]
    ShowMetadata(#[from] MetadataError),

    #[error("Failed to read directory {path}: {source}")]
    ReadRootFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
