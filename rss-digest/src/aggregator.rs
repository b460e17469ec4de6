use crate::dates::DateResolver;
use crate::dedup::{fingerprint, Deduplicator};
use crate::fetcher::Fetcher;
use crate::parser::FeedParser;
use crate::summarizer::Summarizer;
use crate::text;
use crate::types::{Article, FeedEntry, FetchConfig, Result, Source};
use futures::future::join_all;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Fetches, deduplicates, dates and summarizes articles from a set of feeds.
#[derive(Clone)]
pub struct RssAggregator {
    fetcher: Fetcher,
    parser: FeedParser,
    resolver: DateResolver,
    summarizer: Summarizer,
}

impl RssAggregator {
    pub fn new(fetch_config: FetchConfig, summarizer: Summarizer) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(fetch_config)?,
            parser: FeedParser::new(),
            resolver: DateResolver::new(),
            summarizer,
        })
    }

    /// Scrape every source once. Failed feeds and articles are skipped.
    pub async fn scrape(&self, sources: &[Source]) -> Vec<Article> {
        self.scrape_with(sources, Deduplicator::new()).await
    }

    /// Like [`scrape`](Self::scrape), treating `known_ids` as already emitted.
    pub async fn scrape_excluding<I>(&self, sources: &[Source], known_ids: I) -> Vec<Article>
    where
        I: IntoIterator<Item = String>,
    {
        self.scrape_with(sources, Deduplicator::with_known(known_ids)).await
    }

    async fn scrape_with(&self, sources: &[Source], mut dedup: Deduplicator) -> Vec<Article> {
        let start_time = Instant::now();
        info!("Scraping {} sources", sources.len());

        let feeds = join_all(sources.iter().map(|source| async move {
            (source, self.fetcher.fetch_feed(source).await)
        }))
        .await;

        let mut articles = Vec::new();
        let mut failed_feeds = 0;

        for (source, outcome) in feeds {
            let content = match outcome {
                Ok(content) => content,
                Err(_) => {
                    failed_feeds += 1;
                    continue;
                }
            };

            let entries = self.parser.parse(&content);
            debug!("{}: {} entries", source.name, entries.len());

            for entry in entries {
                let id = fingerprint(&entry.link, &entry.title);
                if dedup.seen(&id) {
                    debug!("Skipping duplicate entry: {}", entry.link);
                    continue;
                }

                if let Some(article) = self.build_article(source, &entry, id.clone()).await {
                    dedup.mark(id);
                    articles.push(article);
                }
            }
        }

        info!(
            "Scraped {} articles from {}/{} sources in {:.2?}",
            articles.len(),
            sources.len() - failed_feeds,
            sources.len(),
            start_time.elapsed()
        );
        articles
    }

    async fn build_article(&self, source: &Source, entry: &FeedEntry, id: String) -> Option<Article> {
        let body = match self.fetcher.fetch_article(&entry.link).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Skipping article {} from {}: {}", entry.link, source.name, e);
                return None;
            }
        };

        let publication_date = self.resolver.resolve(entry, Some(&body));

        let content = text::article_text(&body);
        let summary = if content.is_empty() {
            self.summarizer.summarize(&body).await
        } else {
            self.summarizer.summarize(&content).await
        };

        Some(Article {
            id,
            url: entry.link.clone(),
            title: entry.title.clone(),
            summary,
            publication_date,
            source: source.name.clone(),
        })
    }
}
