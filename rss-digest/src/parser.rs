use crate::types::{AggregatorError, FeedEntry, Result};
use feed_rs::parser;
use tracing::{debug, info, warn};

/// Best-effort feed parser for RSS, Atom and JSON Feed documents.
#[derive(Debug, Clone, Default)]
pub struct FeedParser;

impl FeedParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a feed document. Malformed input yields no entries rather than an error.
    pub fn parse(&self, content: &[u8]) -> Vec<FeedEntry> {
        match self.try_parse(content) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("{}", e);
                Vec::new()
            }
        }
    }

    pub fn try_parse(&self, content: &[u8]) -> Result<Vec<FeedEntry>> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content)
            .map_err(|e| AggregatorError::Parse(format!("Failed to parse feed: {}", e)))?;

        let entries: Vec<FeedEntry> = feed
            .entries
            .into_iter()
            .filter_map(Self::parse_entry)
            .collect();

        info!("Parsed feed with {} entries", entries.len());
        Ok(entries)
    }

    fn parse_entry(entry: feed_rs::model::Entry) -> Option<FeedEntry> {
        // Entries without a link have nothing to fetch
        let link = match entry.links.first() {
            Some(link) if !link.href.trim().is_empty() => link.href.trim().to_string(),
            _ => {
                debug!("Skipping entry without link: {}", entry.id);
                return None;
            }
        };

        let title = entry.title.map(|t| t.content).unwrap_or_default();

        Some(FeedEntry {
            link,
            title,
            published: entry.published.map(|dt| dt.fixed_offset()),
            updated: entry.updated.map(|dt| dt.fixed_offset()),
        })
    }
}
