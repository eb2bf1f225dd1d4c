// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use crate::error::MetadataError;

use super::date::parse_pub_date;

/// Episode description as written by the author next to the audio file
#[derive(Debug, Clone, Deserialize)]
struct RawEpisodeMetadata {
    title: String,
    description: String,
    #[serde(default, alias = "pubDate", alias = "date")]
    pub_date: Option<String>,
    #[serde(default)]
    duration: Option<u64>,
    #[serde(default)]
    explicit: Option<bool>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    subtitle: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

/// Parsed metadata for a single episode folder
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeMetadata {
    pub title: String,
    pub description: String,
    pub pub_date: DateTime<FixedOffset>,
    /// Duration in seconds
    pub duration: Option<u64>,
    pub explicit: bool,
    pub author: Option<String>,
    pub subtitle: Option<String>,
    pub link: Option<String>,
}

/// Read episode metadata from a JSON file
///
/// A missing or unparseable publish date is treated like any other malformed
/// file: the episode cannot be placed in the feed order without it.
pub fn read_episode_metadata(path: &Path) -> Result<EpisodeMetadata, MetadataError> {
    let content = std::fs::read_to_string(path).map_err(|e| MetadataError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let raw: RawEpisodeMetadata =
        serde_json::from_str(&content).map_err(|e| MetadataError::JsonParseFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    let date_str = raw
        .pub_date
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| MetadataError::MissingPubDate {
            path: path.to_path_buf(),
        })?;
    let pub_date = parse_pub_date(date_str)?;

    Ok(EpisodeMetadata {
        title: raw.title,
        description: raw.description,
        pub_date,
        duration: raw.duration,
        explicit: raw.explicit.unwrap_or(false),
        author: raw.author,
        subtitle: raw.subtitle,
        link: raw.link,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use tempfile::tempdir;

    #[test]
    fn reads_all_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("episode.json");
        std::fs::write(
            &path,
            r#"{
                "title": "Pilot",
                "description": "The first one",
                "pub_date": "2024-01-15T12:00:00+00:00",
                "duration": 1800,
                "explicit": true,
                "author": "Guest Author",
                "subtitle": "Where it starts",
                "link": "https://example.com/pilot"
            }"#,
        )
        .unwrap();

        let metadata = read_episode_metadata(&path).unwrap();

        assert_eq!(metadata.title, "Pilot");
        assert_eq!(metadata.description, "The first one");
        assert_eq!(metadata.pub_date.day(), 15);
        assert_eq!(metadata.duration, Some(1800));
        assert!(metadata.explicit);
        assert_eq!(metadata.author, Some("Guest Author".to_string()));
        assert_eq!(metadata.subtitle, Some("Where it starts".to_string()));
        assert_eq!(metadata.link, Some("https://example.com/pilot".to_string()));
    }

    #[test]
    fn optional_fields_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("episode.json");
        std::fs::write(
            &path,
            r#"{"title": "Minimal", "description": "", "pubDate": "2024-02-01"}"#,
        )
        .unwrap();

        let metadata = read_episode_metadata(&path).unwrap();

        assert_eq!(metadata.title, "Minimal");
        assert!(!metadata.explicit);
        assert!(metadata.duration.is_none());
        assert!(metadata.author.is_none());
    }

    #[test]
    fn missing_pub_date_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("episode.json");
        std::fs::write(&path, r#"{"title": "Undated", "description": "x"}"#).unwrap();

        let err = read_episode_metadata(&path).unwrap_err();
        assert!(matches!(err, MetadataError::MissingPubDate { .. }));
    }

    #[test]
    fn invalid_json_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("episode.json");
        std::fs::write(&path, "{ not json").unwrap();

        match read_episode_metadata(&path).unwrap_err() {
            MetadataError::JsonParseFailed { path: p, .. } => assert_eq!(p, path),
            other => panic!("Expected JsonParseFailed, got {other:?}"),
        }
    }

    #[test]
    fn read_nonexistent_returns_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nonexistent.json");
        let result = read_episode_metadata(&path);
        assert!(matches!(result, Err(MetadataError::ReadFailed { .. })));
    }
}
