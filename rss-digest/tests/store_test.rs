mod common;

use chrono::DateTime;
use common::init_tracing;
use rss_digest::{AggregatorError, Article, ArticleStore, JsonFileStore, MemoryStore, Preferences, Result, StoreDocument};

fn article(id: &str, source: &str) -> Article {
    Article {
        id: id.to_string(),
        url: format!("https://example.com/{}", id),
        title: format!("Title {}", id),
        summary: "Summary".to_string(),
        publication_date: DateTime::parse_from_rfc3339("2024-10-21T07:28:00+00:00").unwrap(),
        source: source.to_string(),
    }
}

#[tokio::test]
async fn json_store_initializes_and_persists() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("data.json");

    let store = JsonFileStore::open(&path).await?;
    assert!(path.exists());
    assert_eq!(store.load().await?, StoreDocument::default());

    assert_eq!(store.append_articles(vec![article("1", "A"), article("2", "A")]).await?, 2);
    assert_eq!(store.append_articles(vec![article("2", "A"), article("3", "B")]).await?, 1);
    store
        .save_preferences(Preferences::new(vec!["A".into()], vec!["AI".into()]))
        .await?;
    drop(store);

    let reopened = JsonFileStore::open(&path).await?;
    let doc = reopened.load().await?;
    let ids: Vec<&str> = doc.articles.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(doc.preferences.sources, vec!["A"]);
    Ok(())
}

#[tokio::test]
async fn read_later_add_and_remove() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let store = JsonFileStore::open(dir.path().join("data.json")).await?;
    store.append_articles(vec![article("1", "A"), article("2", "A"), article("3", "A")]).await?;

    assert!(store.add_to_read_later("3".to_string()).await?);
    assert!(store.add_to_read_later("1".to_string()).await?);
    assert!(!store.add_to_read_later("1".to_string()).await?);
    assert_eq!(store.read_later().await?, vec!["3", "1"]);

    let listed: Vec<String> = store.read_later_articles().await?.into_iter().map(|a| a.id).collect();
    assert_eq!(listed, vec!["1", "3"]);

    assert!(store.remove_from_read_later("3".to_string()).await?);
    assert!(!store.remove_from_read_later("missing".to_string()).await?);
    assert_eq!(store.read_later().await?, vec!["1"]);
    Ok(())
}

#[tokio::test]
async fn corrupt_store_recovers_from_temp_file() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("data.json");
    let store = JsonFileStore::open(&path).await?;
    store.append_articles(vec![article("1", "A")]).await?;

    let backup = serde_json::to_vec(&store.load().await?)?;
    std::fs::write(dir.path().join("data.json.tmp"), backup)?;
    std::fs::write(&path, b"{ not json")?;

    let doc = store.load().await?;
    assert_eq!(doc.articles.len(), 1);
    Ok(())
}

#[tokio::test]
async fn corrupt_store_is_set_aside_before_write() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("data.json");
    std::fs::write(&path, b"[1, 2")?;

    let store = JsonFileStore::open(&path).await?;
    assert_eq!(store.load().await?, StoreDocument::default());
    assert_eq!(std::fs::read(&path)?, b"[1, 2");

    store.add_to_read_later("x".to_string()).await?;
    assert_eq!(std::fs::read(dir.path().join("data.json.corrupt"))?, b"[1, 2");

    let raw = std::fs::read_to_string(&path)?;
    let doc: StoreDocument = serde_json::from_str(&raw)?;
    assert_eq!(doc.read_later, vec!["x"]);
    Ok(())
}

#[tokio::test]
async fn corrupt_store_is_kept_when_it_cannot_be_set_aside() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("data.json");
    std::fs::write(&path, b"{ truncated")?;
    // A non-empty directory in the way makes the rename fail
    let blocker = dir.path().join("data.json.corrupt");
    std::fs::create_dir(&blocker)?;
    std::fs::write(blocker.join("keep"), b"")?;

    let store = JsonFileStore::open(&path).await?;
    let result = store.add_to_read_later("x".to_string()).await;

    assert!(matches!(result, Err(AggregatorError::Store(_))));
    assert_eq!(std::fs::read(&path)?, b"{ truncated");
    Ok(())
}

#[tokio::test]
async fn stores_with_offsetless_dates_keep_their_data() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("data.json");
    std::fs::write(
        &path,
        br#"{
            "articles": [{
                "id": "abc", "url": "https://www.forbes.com/a", "title": "AI in finance",
                "summary": "Short.", "publication_date": "2024-10-21T07:28:00", "source": "Forbes"
            }],
            "preferences": {"sources": ["Forbes"], "keywords": ["AI"]},
            "read_later": ["abc"]
        }"#,
    )?;

    let store = JsonFileStore::open(&path).await?;
    assert!(store.add_to_read_later("new".to_string()).await?);

    let doc = store.load().await?;
    assert_eq!(doc.articles.len(), 1);
    assert_eq!(
        doc.articles[0].publication_date,
        DateTime::parse_from_rfc3339("2024-10-21T07:28:00+00:00").unwrap()
    );
    assert_eq!(doc.preferences, Preferences::new(vec!["Forbes".into()], vec!["AI".into()]));
    assert_eq!(doc.read_later, vec!["abc", "new"]);
    assert!(!dir.path().join("data.json.corrupt").exists());
    Ok(())
}

#[tokio::test]
async fn missing_keys_default() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("data.json");
    std::fs::write(&path, br#"{"read_later": ["a"]}"#)?;

    let store = JsonFileStore::open(&path).await?;
    let doc = store.load().await?;
    assert!(doc.articles.is_empty());
    assert_eq!(doc.preferences, Preferences::default());
    assert_eq!(doc.read_later, vec!["a"]);
    Ok(())
}

#[tokio::test]
async fn memory_store_matches_file_semantics() -> Result<()> {
    let store = MemoryStore::new();
    assert_eq!(store.append_articles(vec![article("1", "A"), article("1", "A")]).await?, 1);
    assert!(store.add_to_read_later("1".to_string()).await?);
    assert_eq!(store.read_later_articles().await?.len(), 1);
    Ok(())
}
