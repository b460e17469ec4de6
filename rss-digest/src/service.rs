use crate::aggregator::RssAggregator;
use crate::config::AppConfig;
use crate::store::ArticleStore;
use crate::types::{Article, Preferences, Result, Source};
use std::sync::Arc;
use tracing::{info, warn};

/// Ties configuration, the scraping pipeline and the store together.
pub struct DigestService<S> {
    config: AppConfig,
    aggregator: RssAggregator,
    store: Arc<S>,
}

impl<S: ArticleStore> DigestService<S> {
    pub fn new(config: AppConfig, aggregator: RssAggregator, store: Arc<S>) -> Self {
        Self {
            config,
            aggregator,
            store,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Configured sources for `names`; unknown names are logged and dropped.
    pub fn selected_sources(&self, names: &[String]) -> Vec<Source> {
        names
            .iter()
            .filter_map(|name| match self.config.source(name) {
                Some(source) => Some(source.clone()),
                None => {
                    warn!("Ignoring unknown source: {}", name);
                    None
                }
            })
            .collect()
    }

    /// Stored articles that pass the saved preferences.
    pub async fn filtered_articles(&self) -> Result<Vec<Article>> {
        Ok(self.filtered_view().await?.1)
    }

    /// Saved preferences together with the articles they admit, read from one snapshot.
    pub async fn filtered_view(&self) -> Result<(Preferences, Vec<Article>)> {
        let doc = self.store.load().await?;
        let articles: Vec<Article> = doc
            .preferences
            .filter(&doc.articles)
            .into_iter()
            .cloned()
            .collect();
        Ok((doc.preferences, articles))
    }

    /// Scrape `sources`, skipping articles already stored, and append the rest.
    pub async fn scrape_and_store(&self, sources: &[Source]) -> Result<Vec<Article>> {
        if sources.is_empty() {
            return Ok(Vec::new());
        }

        let known: Vec<String> = self
            .store
            .articles()
            .await?
            .into_iter()
            .map(|article| article.id)
            .collect();

        let articles = self.aggregator.scrape_excluding(sources, known).await;
        let added = self.store.append_articles(articles.clone()).await?;
        info!("Stored {} new articles", added);
        Ok(articles)
    }

    /// Replace preferences, then scrape the newly selected sources.
    /// Returns the number of articles added to the store.
    pub async fn save_preferences(&self, preferences: Preferences) -> Result<usize> {
        let preferences = Preferences::new(preferences.sources, preferences.keywords);
        let sources = self.selected_sources(&preferences.sources);
        self.store.save_preferences(preferences).await?;

        Ok(self.scrape_and_store(&sources).await?.len())
    }

    /// Re-scrape the currently selected sources.
    pub async fn refresh(&self) -> Result<usize> {
        let preferences = self.store.preferences().await?;
        let sources = self.selected_sources(&preferences.sources);
        info!("Refreshing {} selected sources", sources.len());

        Ok(self.scrape_and_store(&sources).await?.len())
    }

    pub async fn read_later_articles(&self) -> Result<Vec<Article>> {
        self.store.read_later_articles().await
    }

    pub async fn add_to_read_later(&self, id: String) -> Result<bool> {
        self.store.add_to_read_later(id).await
    }

    pub async fn remove_from_read_later(&self, id: String) -> Result<bool> {
        self.store.remove_from_read_later(id).await
    }
}
