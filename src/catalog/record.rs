// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use url::Url;

use crate::error::AdmissionError;
use crate::metadata::{EpisodeMetadata, ShowDescriptor};

use super::validate::{FolderContents, audio_mime_type};

/// Turns paths below the watched root into public URLs
#[derive(Debug, Clone, PartialEq)]
pub struct MediaLocator {
    base_url: Url,
    default_artwork: Option<Url>,
}

impl MediaLocator {
    /// Create a locator rooted at `base_url`, resolving the show's default artwork
    pub fn new(base_url: Url, show: &ShowDescriptor) -> Self {
        let default_artwork = show.image.as_deref().and_then(|image| {
            let segments: Vec<&str> = image.split('/').filter(|s| !s.is_empty()).collect();
            join_segments(&base_url, &segments).ok()
        });

        Self {
            base_url,
            default_artwork,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn default_artwork(&self) -> Option<&Url> {
        self.default_artwork.as_ref()
    }

    /// URL of a file inside an episode folder
    pub fn episode_file(&self, key: &str, filename: &str) -> Result<Url, AdmissionError> {
        join_segments(&self.base_url, &[key, filename]).map_err(|reason| {
            AdmissionError::InvalidLocator {
                key: key.to_string(),
                reason,
            }
        })
    }
}

fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, String> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| format!("base URL {base} cannot carry a path"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// A playable file referenced by the feed
#[derive(Debug, Clone, PartialEq)]
pub struct MediaReference {
    pub url: Url,
    pub path: PathBuf,
    pub mime_type: &'static str,
    /// Size in bytes when the episode was admitted
    pub length: Option<u64>,
}

/// One admitted episode
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeRecord {
    /// Name of the source folder
    pub key: String,
    pub title: String,
    pub description: String,
    pub pub_date: DateTime<FixedOffset>,
    pub audio: MediaReference,
    /// Duration in seconds
    pub duration: Option<u64>,
    pub artwork: Option<Url>,
    pub explicit: bool,
    pub author: Option<String>,
    pub subtitle: Option<String>,
    pub link: Option<String>,
}

impl EpisodeRecord {
    /// Build a record from a validated folder and its parsed metadata
    pub fn build(
        key: &str,
        folder: &Path,
        contents: &FolderContents,
        metadata: EpisodeMetadata,
        locator: &MediaLocator,
    ) -> Result<Self, AdmissionError> {
        let audio_path = folder.join(&contents.audio_file);
        let length = std::fs::metadata(&audio_path).ok().map(|m| m.len());

        let audio = MediaReference {
            url: locator.episode_file(key, &contents.audio_file)?,
            path: audio_path,
            mime_type: audio_mime_type(&contents.audio_file).unwrap_or("audio/x-m4a"),
            length,
        };

        let artwork = match &contents.artwork_file {
            Some(file) => Some(locator.episode_file(key, file)?),
            None => locator.default_artwork().cloned(),
        };

        Ok(Self {
            key: key.to_string(),
            title: metadata.title,
            description: metadata.description,
            pub_date: metadata.pub_date,
            audio,
            duration: metadata.duration,
            artwork,
            explicit: metadata.explicit,
            author: metadata.author,
            subtitle: metadata.subtitle,
            link: metadata.link,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::parse_pub_date;
    use tempfile::tempdir;

    fn make_metadata() -> EpisodeMetadata {
        EpisodeMetadata {
            title: "Episode 1".to_string(),
            description: "First".to_string(),
            pub_date: parse_pub_date("2024-01-02").unwrap(),
            duration: Some(60),
            explicit: false,
            author: None,
            subtitle: None,
            link: None,
        }
    }

    fn make_locator(image: Option<&str>) -> MediaLocator {
        let mut show = ShowDescriptor::titled("Show");
        show.image = image.map(String::from);
        MediaLocator::new(Url::parse("http://localhost:3000/").unwrap(), &show)
    }

    #[test]
    fn episode_urls_are_percent_encoded() {
        let locator = make_locator(None);
        let url = locator.episode_file("My Episode", "part 1.m4a").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/My%20Episode/part%201.m4a");
    }

    #[test]
    fn base_path_is_preserved() {
        let show = ShowDescriptor::titled("Show");
        let locator = MediaLocator::new(Url::parse("https://example.com/pod/").unwrap(), &show);
        let url = locator.episode_file("E1", "a.mp3").unwrap();
        assert_eq!(url.as_str(), "https://example.com/pod/E1/a.mp3");
    }

    #[test]
    fn build_uses_folder_artwork() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.m4a"), b"12345").unwrap();
        let contents = FolderContents {
            audio_file: "a.m4a".to_string(),
            metadata_file: "a.json".to_string(),
            artwork_file: Some("cover.png".to_string()),
        };

        let record = EpisodeRecord::build(
            "E1",
            dir.path(),
            &contents,
            make_metadata(),
            &make_locator(Some("show.png")),
        )
        .unwrap();

        assert_eq!(record.key, "E1");
        assert_eq!(record.audio.mime_type, "audio/x-m4a");
        assert_eq!(record.audio.length, Some(5));
        assert_eq!(record.audio.path, dir.path().join("a.m4a"));
        assert_eq!(
            record.artwork.unwrap().as_str(),
            "http://localhost:3000/E1/cover.png"
        );
    }

    #[test]
    fn build_falls_back_to_show_artwork() {
        let dir = tempdir().unwrap();
        let contents = FolderContents {
            audio_file: "a.mp3".to_string(),
            metadata_file: "a.json".to_string(),
            artwork_file: None,
        };

        let record = EpisodeRecord::build(
            "E1",
            dir.path(),
            &contents,
            make_metadata(),
            &make_locator(Some("art/show.png")),
        )
        .unwrap();

        assert_eq!(record.audio.mime_type, "audio/mpeg");
        assert_eq!(record.audio.length, None);
        assert_eq!(
            record.artwork.unwrap().as_str(),
            "http://localhost:3000/art/show.png"
        );
    }

    #[test]
    fn no_artwork_anywhere() {
        let dir = tempdir().unwrap();
        let contents = FolderContents {
            audio_file: "a.mp3".to_string(),
            metadata_file: "a.json".to_string(),
            artwork_file: None,
        };

        let record =
            EpisodeRecord::build("E1", dir.path(), &contents, make_metadata(), &make_locator(None))
                .unwrap();
        assert!(record.artwork.is_none());
    }

    #[test]
    fn cannot_be_a_base_url_is_rejected() {
        let show = ShowDescriptor::titled("Show");
        let locator = MediaLocator::new(Url::parse("mailto:someone@example.com").unwrap(), &show);
        let err = locator.episode_file("E1", "a.mp3").unwrap_err();
        assert!(matches!(err, AdmissionError::InvalidLocator { .. }));
    }
}
