// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use rss::extension::itunes::{
    ITunesCategory, ITunesCategoryBuilder, ITunesChannelExtension,
    ITunesChannelExtensionBuilder, ITunesItemExtension, ITunesItemExtensionBuilder,
    ITunesOwnerBuilder,
};
use rss::{
    Category, CategoryBuilder, Channel, ChannelBuilder, EnclosureBuilder, GuidBuilder,
    ImageBuilder, Item, ItemBuilder,
};

use crate::catalog::{EpisodeRecord, MediaLocator};
use crate::metadata::ShowDescriptor;

const DEFAULT_TTL_MINUTES: u32 = 60;
const DEFAULT_LANGUAGE: &str = "en";
const RSS_DOCS_URL: &str = "https://www.rssboard.org/rss-specification";
const GENERATOR: &str = concat!("podwatch ", env!("CARGO_PKG_VERSION"));

/// Build the feed for the show and the given episodes, in the given order
///
/// The channel is rebuilt from scratch on every call, so it always lists
/// exactly the episodes passed in.
pub fn project(
    show: &ShowDescriptor,
    locator: &MediaLocator,
    episodes: &[EpisodeRecord],
) -> Channel {
    let site_url = show
        .site_url
        .as_ref()
        .unwrap_or(locator.base_url())
        .to_string();
    let artwork = locator.default_artwork().map(|u| u.to_string());

    let image = artwork.as_ref().map(|url| {
        ImageBuilder::default()
            .url(url.clone())
            .title(show.title.clone())
            .link(site_url.clone())
            .build()
    });

    // Newest episode defines when the feed last changed
    let last_build_date = episodes
        .iter()
        .map(|e| e.pub_date)
        .max()
        .or(show.pub_date)
        .map(|dt| dt.to_rfc2822());

    let items: Vec<Item> = episodes
        .iter()
        .map(|episode| project_episode(show, episode))
        .collect();

    ChannelBuilder::default()
        .title(show.title.clone())
        .link(site_url)
        .description(show.description.clone())
        .language(Some(
            show.language
                .clone()
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        ))
        .copyright(show.copyright.clone())
        .managing_editor(show.author.clone())
        .webmaster(show.author.clone())
        .pub_date(show.pub_date.map(|dt| dt.to_rfc2822()))
        .last_build_date(last_build_date)
        .categories(channel_categories(show))
        .generator(Some(GENERATOR.to_string()))
        .docs(Some(RSS_DOCS_URL.to_string()))
        .ttl(Some(
            show.ttl.unwrap_or(DEFAULT_TTL_MINUTES).to_string(),
        ))
        .image(image)
        .items(items)
        .itunes_ext(Some(channel_itunes(show, artwork)))
        .build()
}

fn channel_categories(show: &ShowDescriptor) -> Vec<Category> {
    [&show.category, &show.subcategory]
        .into_iter()
        .flatten()
        .map(|name| CategoryBuilder::default().name(name.clone()).build())
        .collect()
}

fn channel_itunes(show: &ShowDescriptor, artwork: Option<String>) -> ITunesChannelExtension {
    let owner = show.owner.as_ref().map(|owner| {
        ITunesOwnerBuilder::default()
            .name(Some(owner.name.clone()))
            .email(owner.email.clone())
            .build()
    });

    let categories: Vec<ITunesCategory> = show
        .category
        .as_ref()
        .map(|text| {
            let subcategory = show.subcategory.as_ref().map(|sub| {
                Box::new(ITunesCategoryBuilder::default().text(sub.clone()).build())
            });
            ITunesCategoryBuilder::default()
                .text(text.clone())
                .subcategory(subcategory)
                .build()
        })
        .into_iter()
        .collect();

    ITunesChannelExtensionBuilder::default()
        .author(show.author.clone())
        .summary(Some(show.description.clone()).filter(|s| !s.is_empty()))
        .explicit(Some(explicit_flag(show.explicit)))
        .owner(owner)
        .categories(categories)
        .image(artwork)
        .new_feed_url(show.feed_url.as_ref().map(|u| u.to_string()))
        .build()
}

fn project_episode(show: &ShowDescriptor, episode: &EpisodeRecord) -> Item {
    let audio_url = episode.audio.url.to_string();

    let enclosure = EnclosureBuilder::default()
        .url(audio_url.clone())
        .length(episode.audio.length.unwrap_or(0).to_string())
        .mime_type(episode.audio.mime_type.to_string())
        .build();

    let guid = GuidBuilder::default()
        .value(audio_url.clone())
        .permalink(false)
        .build();

    ItemBuilder::default()
        .title(Some(episode.title.clone()))
        .link(Some(episode.link.clone().unwrap_or(audio_url)))
        .description(Some(episode.description.clone()))
        .author(episode.author.clone())
        .guid(Some(guid))
        .pub_date(Some(episode.pub_date.to_rfc2822()))
        .enclosure(Some(enclosure))
        .itunes_ext(Some(episode_itunes(show, episode)))
        .build()
}

fn episode_itunes(show: &ShowDescriptor, episode: &EpisodeRecord) -> ITunesItemExtension {
    ITunesItemExtensionBuilder::default()
        .author(episode.author.clone().or_else(|| show.author.clone()))
        .duration(episode.duration.map(format_duration))
        .explicit(Some(explicit_flag(episode.explicit)))
        .image(episode.artwork.as_ref().map(|u| u.to_string()))
        .subtitle(episode.subtitle.clone())
        .summary(Some(episode.description.clone()).filter(|s| !s.is_empty()))
        .build()
}

fn explicit_flag(explicit: bool) -> String {
    let flag = if explicit { "true" } else { "false" };
    flag.to_string()
}

/// Format seconds as `H:MM:SS`
fn format_duration(seconds: u64) -> String {
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
