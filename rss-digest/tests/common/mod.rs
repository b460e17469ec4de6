#![allow(dead_code)]

use rss_digest::{FetchConfig, MockLlmAdapter, RssAggregator, Source, Summarizer, SummarizerConfig};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// RSS 2.0 document with one item per `(title, link, pub_date)`.
pub fn rss(items: &[(&str, &str, Option<&str>)]) -> String {
    let items: String = items
        .iter()
        .enumerate()
        .map(|(i, (title, link, pub_date))| {
            let date = pub_date
                .map(|d| format!("<pubDate>{}</pubDate>", d))
                .unwrap_or_default();
            format!(
                "<item><title>{}</title><link>{}</link><guid isPermaLink=\"false\">{}</guid>{}</item>",
                title, link, i, date
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Test</title><link>http://example.com/</link><description>d</description>{}</channel></rss>"#,
        items
    )
}

pub fn article_page(text: &str) -> String {
    format!("<html><head><title>t</title></head><body><p>{}</p></body></html>", text)
}

pub async fn mount_feed(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/rss+xml"))
        .mount(server)
        .await;
}

pub async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

pub fn source(server: &MockServer, name: &str, route: &str) -> Source {
    Source::new(name, &server.uri(), &format!("{}{}", server.uri(), route))
}

pub fn aggregator_with(adapter: MockLlmAdapter) -> RssAggregator {
    let fetch = FetchConfig {
        timeout_seconds: 5,
        ..FetchConfig::default()
    };
    let summarizer = Summarizer::new(Arc::new(adapter), SummarizerConfig::default());
    RssAggregator::new(fetch, summarizer).unwrap()
}

pub fn aggregator() -> RssAggregator {
    aggregator_with(MockLlmAdapter::new("test".to_string()))
}
