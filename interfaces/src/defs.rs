use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// A configured feed. `name` is unique and joins articles back to their source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    #[serde(alias = "url")]
    pub homepage: String,
    #[serde(alias = "rss")]
    pub feed_url: String,
}

impl Source {
    pub fn new(name: &str, homepage: &str, feed_url: &str) -> Self {
        Self {
            name: name.to_owned(),
            homepage: homepage.to_owned(),
            feed_url: feed_url.to_owned(),
        }
    }
}

/// A feed item as parsed from the feed document, before any enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub link: String,
    pub title: String,
    pub published: Option<DateTime<FixedOffset>>,
    pub updated: Option<DateTime<FixedOffset>>,
}

/// A summarized article as persisted and served to readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Fingerprint of `url` + `title`
    pub id: String,
    pub url: String,
    pub title: String,
    pub summary: String,
    /// Stored values without an offset are read as UTC
    #[serde(deserialize_with = "lenient_timestamp")]
    pub publication_date: DateTime<FixedOffset>,
    /// `Source::name` of the feed this article came from
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Preferences {
    /// Builds preferences with repeated values dropped, keeping first occurrences.
    pub fn new(sources: Vec<String>, keywords: Vec<String>) -> Self {
        Self {
            sources: unique(sources),
            keywords: unique(keywords),
        }
    }

    /// An article passes when its source is selected and at least one keyword
    /// appears, case-insensitively, in its title or summary.
    pub fn admits(&self, article: &Article) -> bool {
        if !self.sources.iter().any(|name| name == &article.source) {
            return false;
        }

        let title = article.title.to_lowercase();
        let summary = article.summary.to_lowercase();
        self.keywords.iter().any(|keyword| {
            let keyword = keyword.to_lowercase();
            title.contains(&keyword) || summary.contains(&keyword)
        })
    }

    pub fn filter<'a>(&self, articles: &'a [Article]) -> Vec<&'a Article> {
        articles.iter().filter(|article| self.admits(article)).collect()
    }
}

/// The whole persisted state: one document, read and written as a unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub read_later: Vec<String>,
}

const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// RFC 3339 timestamps, or ISO-8601 ones with no offset, which are taken as UTC.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(&value) {
        return Ok(timestamp);
    }

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&value, format).ok())
        .map(|naive| naive.and_utc().fixed_offset())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {value}")))
}

fn unique(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(source: &str, title: &str, summary: &str) -> Article {
        Article {
            id: format!("{source}-{title}"),
            url: "https://example.com/a".to_owned(),
            title: title.to_owned(),
            summary: summary.to_owned(),
            publication_date: DateTime::parse_from_rfc3339("2024-10-21T07:28:00+00:00").unwrap(),
            source: source.to_owned(),
        }
    }

    #[test]
    fn filter_keeps_only_matching_keyword_and_source() {
        let prefs = Preferences::new(vec!["A".into()], vec!["AI".into()]);
        let articles = vec![article("A", "AI boom", "..."), article("A", "Weather", "rain")];

        let kept = prefs.filter(&articles);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "AI boom");
    }

    #[test]
    fn keyword_match_is_case_insensitive_and_checks_summary() {
        let prefs = Preferences::new(vec!["A".into()], vec!["web3".into()]);
        assert!(prefs.admits(&article("A", "Markets", "The WEB3 rally continues")));
        assert!(!prefs.admits(&article("B", "Web3 news", "")));
    }

    #[test]
    fn empty_keywords_admit_nothing() {
        let prefs = Preferences::new(vec!["A".into()], Vec::new());
        assert!(!prefs.admits(&article("A", "AI boom", "")));
    }

    #[test]
    fn preferences_drop_repeated_values() {
        let prefs = Preferences::new(
            vec!["A".into(), "B".into(), "A".into()],
            vec!["AI".into(), "AI".into()],
        );
        assert_eq!(prefs.sources, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(prefs.keywords, vec!["AI".to_string()]);
    }

    #[test]
    fn source_accepts_legacy_keys() {
        let source: Source = serde_json::from_str(
            r#"{"name": "GreenBiz", "url": "https://www.greenbiz.com/", "rss": "https://rss.app/feeds/x.xml"}"#,
        )
        .unwrap();
        assert_eq!(source.homepage, "https://www.greenbiz.com/");
        assert_eq!(source.feed_url, "https://rss.app/feeds/x.xml");
    }

    #[test]
    fn store_document_defaults_missing_keys() {
        let doc: StoreDocument = serde_json::from_str(r#"{"articles": []}"#).unwrap();
        assert!(doc.read_later.is_empty());
        assert!(doc.preferences.sources.is_empty());
    }

    #[test]
    fn article_dates_without_offset_are_read_as_utc() {
        let article: Article = serde_json::from_str(
            r#"{"id": "x", "url": "u", "title": "t", "summary": "s",
                "publication_date": "2024-10-21T07:28:00", "source": "Forbes"}"#,
        )
        .unwrap();
        assert_eq!(
            article.publication_date,
            DateTime::parse_from_rfc3339("2024-10-21T07:28:00+00:00").unwrap()
        );

        let with_offset: Article = serde_json::from_str(
            r#"{"id": "x", "url": "u", "title": "t", "summary": "s",
                "publication_date": "2024-10-21T07:28:00.5+02:00", "source": "Forbes"}"#,
        )
        .unwrap();
        assert_eq!(with_offset.publication_date.offset().local_minus_utc(), 7200);

        let bad = serde_json::from_str::<Article>(
            r#"{"id": "x", "url": "u", "title": "t", "summary": "s",
                "publication_date": "yesterday", "source": "Forbes"}"#,
        );
        assert!(bad.is_err());
    }
}
