// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::error::MetadataError;

/// Formats carrying an explicit offset, tried after RFC 3339 and RFC 2822
const OFFSET_FORMATS: [&str; 4] = [
    "%a, %d %b %Y %H:%M:%S %z",
    "%Y-%m-%dT%H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S %z",
    "%B %d, %Y %H:%M:%S %z",
];

/// Date-time formats naming UTC by zone abbreviation
const UTC_FORMATS: [&str; 4] = [
    "%B %d, %Y %H:%M:%S GMT",
    "%B %d, %Y %H:%M:%S UTC",
    "%Y-%m-%d %H:%M:%S GMT",
    "%Y-%m-%d %H:%M:%S UTC",
];

/// Date-only formats, interpreted as midnight UTC
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%B %d, %Y"];

/// Parse a publish date as written by hand in a metadata file
pub fn parse_pub_date(date_str: &str) -> Result<DateTime<FixedOffset>, MetadataError> {
    let trimmed = date_str.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Ok(dt);
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }

    for format in UTC_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format)
            && let Some(midnight) = date.and_hms_opt(0, 0, 0)
        {
            return Ok(midnight.and_utc().fixed_offset());
        }
    }

    Err(MetadataError::InvalidDate {
        date_str: date_str.to_string(),
        reason: "unrecognized date format".to_string(),
    })
}
