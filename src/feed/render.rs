// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io::Write;

use rss::Channel;

use crate::error::FeedError;

/// Write a projected channel as indented RSS XML
pub fn write_feed<W: Write>(channel: &Channel, writer: W) -> Result<W, FeedError> {
    Ok(channel.pretty_write_to(writer, b' ', 2)?)
}

/// Render a projected channel to an XML string
pub fn render_feed(channel: &Channel) -> Result<String, FeedError> {
    let buffer = write_feed(channel, Vec::new())?;
    Ok(String::from_utf8(buffer)?)
}
