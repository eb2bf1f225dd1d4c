// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use url::Url;

use crate::error::MetadataError;

use super::date::parse_pub_date;

pub const SHOW_METADATA_FILENAME: &str = "podcast.json";

/// Owner identity published in the iTunes block
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShowOwner {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawShowMetadata {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    owner: Option<ShowOwner>,
    #[serde(default)]
    copyright: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    subcategory: Option<String>,
    #[serde(default, alias = "pubDate")]
    pub_date: Option<String>,
    #[serde(default, alias = "imageUrl")]
    image: Option<String>,
    #[serde(default, alias = "feedUrl")]
    feed_url: Option<Url>,
    #[serde(default, alias = "siteUrl")]
    site_url: Option<Url>,
    #[serde(default)]
    explicit: Option<bool>,
    #[serde(default)]
    ttl: Option<u32>,
}

/// Show-level metadata, loaded once from the root of the watched directory
#[derive(Debug, Clone, PartialEq)]
pub struct ShowDescriptor {
    pub title: String,
    pub description: String,
    pub author: Option<String>,
    pub owner: Option<ShowOwner>,
    pub copyright: Option<String>,
    pub language: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub pub_date: Option<DateTime<FixedOffset>>,
    /// Default artwork, relative to the watched root
    pub image: Option<String>,
    pub feed_url: Option<Url>,
    pub site_url: Option<Url>,
    pub explicit: bool,
    /// Cache lifetime in minutes
    pub ttl: Option<u32>,
}

impl ShowDescriptor {
    /// A descriptor with only a title, everything else unset
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            author: None,
            owner: None,
            copyright: None,
            language: None,
            category: None,
            subcategory: None,
            pub_date: None,
            image: None,
            feed_url: None,
            site_url: None,
            explicit: false,
            ttl: None,
        }
    }
}

/// Read the show descriptor from the watched root
pub fn read_show_descriptor(root: &Path) -> Result<ShowDescriptor, MetadataError> {
    let path = root.join(SHOW_METADATA_FILENAME);

    let content = std::fs::read_to_string(&path).map_err(|e| MetadataError::ReadFailed {
        path: path.clone(),
        source: e,
    })?;

    let raw: RawShowMetadata = serde_json::from_str(&content)
        .map_err(|e| MetadataError::JsonParseFailed { path, source: e })?;

    let pub_date = raw.pub_date.as_deref().map(parse_pub_date).transpose()?;

    Ok(ShowDescriptor {
        title: raw.title,
        description: raw.description.unwrap_or_default(),
        author: raw.author,
        owner: raw.owner,
        copyright: raw.copyright,
        language: raw.language,
        category: raw.category,
        subcategory: raw.subcategory,
        pub_date,
        image: raw.image.filter(|s| !s.is_empty()),
        feed_url: raw.feed_url,
        site_url: raw.site_url,
        explicit: raw.explicit.unwrap_or(false),
        ttl: raw.ttl,
    })
}
