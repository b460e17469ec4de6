// Use the interfaces crate for core types
pub use interfaces::defs::{Article, FeedEntry, Preferences, Source, StoreDocument};

/// Placeholder summary stored when the language model call fails.
pub const SUMMARY_ERROR_SENTINEL: &str = "Error generating summary";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_body_size_mb: usize,
    pub follow_redirects: bool,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "RSS-Digest/1.0".to_string(),
            timeout_seconds: 30,
            max_body_size_mb: 10,
            follow_redirects: true,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub system_prompt: String,
    /// Longest prefix of article text sent to the model, in characters
    pub max_input_chars: usize,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            system_prompt: "You are a helpful assistant that summarizes articles.".to_string(),
            max_input_chars: 4000,
            max_tokens: 150,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Response body from {url} exceeds {limit_mb}MB")]
    BodyTooLarge { url: String, limit_mb: usize },

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Summarization error: {0}")]
    Summarization(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
