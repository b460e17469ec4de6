pub mod types;
pub mod fetcher;
pub mod parser;
pub mod dates;
pub mod dedup;
pub mod text;
pub mod llm_adapter;
pub mod summarizer;
pub mod aggregator;
pub mod store;
pub mod config;
pub mod service;
pub mod routes;

pub use types::*;
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use dates::DateResolver;
pub use dedup::{fingerprint, Deduplicator};
pub use llm_adapter::{LlmAdapter, MockLlmAdapter, OpenAiAdapter};
pub use summarizer::Summarizer;
pub use aggregator::RssAggregator;
pub use store::{ArticleStore, JsonFileStore, MemoryStore};
pub use config::AppConfig;
pub use service::DigestService;
pub use routes::create_router;
