use crate::types::FeedEntry;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone};
use scraper::{Html, Selector};
use tracing::debug;

/// `<meta>` tags that may carry a publication time, highest priority first.
const META_DATE_SELECTORS: [&str; 4] = [
    r#"meta[property="article:published_time"]"#,
    r#"meta[name="DCTIME"]"#,
    r#"meta[name="published"]"#,
    r#"meta[name="created"]"#,
];

const DATETIME_WITH_OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%a, %d %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M:%S %z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y%m%dT%H%M%S",
    "%d %B %Y %H:%M",
    "%B %d, %Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d.%m.%Y",
    "%m/%d/%Y",
];

/// Picks an article's publication time from the best available evidence.
#[derive(Debug, Clone, Default)]
pub struct DateResolver;

impl DateResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolution order: entry `published`, entry `updated`, the first
    /// publication `<meta>` tag in the body, then the current local time.
    pub fn resolve(&self, entry: &FeedEntry, body: Option<&str>) -> DateTime<FixedOffset> {
        if let Some(published) = entry.published {
            return published;
        }
        if let Some(updated) = entry.updated {
            return updated;
        }

        if let Some(html) = body {
            // Only the highest-priority tag is consulted; a bad value falls back to now
            if let Some(value) = meta_date_value(html) {
                match parse_date_permissive(&value) {
                    Some(date) => return date,
                    None => debug!("Unparseable meta date '{}' for {}", value, entry.link),
                }
            }
        }

        Local::now().fixed_offset()
    }
}

/// `content` of the highest-priority publication `<meta>` tag in `html`.
///
/// Returns `None` when no such tag exists or when the first one found has no
/// `content` attribute.
pub fn meta_date_value(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for selector in META_DATE_SELECTORS {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        if let Some(tag) = document.select(&selector).next() {
            return tag.value().attr("content").map(|value| value.trim().to_string());
        }
    }

    None
}

/// Parse a free-form date string. Values without an offset are read in local time.
pub fn parse_date_permissive(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date);
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date);
    }

    for format in DATETIME_WITH_OFFSET_FORMATS {
        if let Ok(date) = DateTime::parse_from_str(value, format) {
            return Some(date);
        }
    }

    // Trailing "Z" is not accepted by %z
    if let Some(stripped) = value.strip_suffix('Z') {
        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(stripped, format) {
                return Some(naive.and_utc().fixed_offset());
            }
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return local_datetime(naive);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0).and_then(local_datetime);
        }
    }

    None
}

fn local_datetime(naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
}
