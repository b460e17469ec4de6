use crate::types::{AggregatorError, Article, Preferences, Result, StoreDocument};
use async_trait::async_trait;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Persistence for the aggregator's single state document.
///
/// Every mutation goes through [`update`](ArticleStore::update), which runs
/// the closure against the current document and persists the result before
/// any other caller can observe or change it.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn load(&self) -> Result<StoreDocument>;

    async fn update<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut StoreDocument) -> R + Send,
        R: Send;

    async fn articles(&self) -> Result<Vec<Article>> {
        Ok(self.load().await?.articles)
    }

    async fn preferences(&self) -> Result<Preferences> {
        Ok(self.load().await?.preferences)
    }

    async fn read_later(&self) -> Result<Vec<String>> {
        Ok(self.load().await?.read_later)
    }

    async fn save_preferences(&self, preferences: Preferences) -> Result<()> {
        self.update(move |doc| doc.preferences = preferences).await
    }

    /// Append articles whose ids are not stored yet. Returns how many were added.
    async fn append_articles(&self, articles: Vec<Article>) -> Result<usize> {
        self.update(move |doc| {
            let mut known: HashSet<String> = doc.articles.iter().map(|a| a.id.clone()).collect();
            let before = doc.articles.len();
            for article in articles {
                if known.insert(article.id.clone()) {
                    doc.articles.push(article);
                }
            }
            doc.articles.len() - before
        })
        .await
    }

    /// Returns false when the id was already listed.
    async fn add_to_read_later(&self, id: String) -> Result<bool> {
        self.update(move |doc| {
            if doc.read_later.contains(&id) {
                false
            } else {
                doc.read_later.push(id);
                true
            }
        })
        .await
    }

    /// Returns false when the id was not listed.
    async fn remove_from_read_later(&self, id: String) -> Result<bool> {
        self.update(move |doc| {
            let before = doc.read_later.len();
            doc.read_later.retain(|listed| listed != &id);
            doc.read_later.len() != before
        })
        .await
    }

    /// Stored articles that are on the read-later list, in store order.
    async fn read_later_articles(&self) -> Result<Vec<Article>> {
        let doc = self.load().await?;
        let listed: HashSet<&String> = doc.read_later.iter().collect();
        Ok(doc
            .articles
            .iter()
            .filter(|article| listed.contains(&article.id))
            .cloned()
            .collect())
    }
}

/// Store backed by a pretty-printed JSON file.
///
/// Writes go to `<file>.tmp` first and are renamed over the real file, so a
/// crash leaves either the old or the new document on disk. A file that
/// exists but does not parse is moved to `<file>.corrupt` before the next
/// write replaces it.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating an empty document if none exists.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let store = Self {
            path,
            lock: Mutex::new(()),
        };

        if !tokio::fs::try_exists(&store.path).await? {
            info!("Initializing empty store at {}", store.path.display());
            store.write_document(&StoreDocument::default()).await?;
        }

        Ok(store)
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }

    fn tmp_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    async fn read_json(path: &Path) -> Result<StoreDocument> {
        let raw = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Current document; falls back to the temp file, then to an empty one.
    /// The flag is set when the main file exists but could not be parsed.
    async fn read_document(&self) -> (StoreDocument, bool) {
        let unreadable = match Self::read_json(&self.path).await {
            Ok(doc) => return (doc, false),
            Err(AggregatorError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                warn!("Store {} is missing", self.path.display());
                false
            }
            Err(e) => {
                warn!("Could not read store {}: {}", self.path.display(), e);
                true
            }
        };

        let tmp = self.tmp_path();
        let doc = match Self::read_json(&tmp).await {
            Ok(doc) => {
                info!("Recovered store from {}", tmp.display());
                doc
            }
            Err(e) => {
                warn!("No usable backup at {} ({}), starting empty", tmp.display(), e);
                StoreDocument::default()
            }
        };
        (doc, unreadable)
    }

    /// Keep an unparseable store file out of the way of the next write.
    async fn set_aside_unreadable(&self) -> Result<()> {
        let target = self.sibling(".corrupt");
        tokio::fs::rename(&self.path, &target).await.map_err(|e| {
            AggregatorError::Store(format!(
                "cannot move unreadable store {} aside: {}",
                self.path.display(),
                e
            ))
        })?;
        warn!("Moved unreadable store to {}", target.display());
        Ok(())
    }

    async fn write_document(&self, doc: &StoreDocument) -> Result<()> {
        let tmp = self.tmp_path();
        let json = serde_json::to_vec_pretty(doc)?;
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(
            "Wrote store {} ({} articles)",
            self.path.display(),
            doc.articles.len()
        );
        Ok(())
    }
}

#[async_trait]
impl ArticleStore for JsonFileStore {
    async fn load(&self) -> Result<StoreDocument> {
        let _guard = self.lock.lock().await;
        Ok(self.read_document().await.0)
    }

    async fn update<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut StoreDocument) -> R + Send,
        R: Send,
    {
        let _guard = self.lock.lock().await;
        let (mut doc, unreadable) = self.read_document().await;
        if unreadable {
            self.set_aside_unreadable().await?;
        }
        let result = f(&mut doc);
        self.write_document(&doc).await?;
        Ok(result)
    }
}

/// In-process store, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: Mutex<StoreDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(doc: StoreDocument) -> Self {
        Self {
            doc: Mutex::new(doc),
        }
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn load(&self) -> Result<StoreDocument> {
        Ok(self.doc.lock().await.clone())
    }

    async fn update<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut StoreDocument) -> R + Send,
        R: Send,
    {
        let mut doc = self.doc.lock().await;
        Ok(f(&mut *doc))
    }
}
