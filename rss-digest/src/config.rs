use crate::types::{AggregatorError, FetchConfig, Result, Source, SummarizerConfig};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::info;

/// Keywords offered to readers before they pick their own.
pub const DEFAULT_KEYWORDS: [&str; 6] = [
    "tokenization",
    "web3",
    "RWA",
    "AI",
    "Biodiversity",
    "nature based carbon credits",
];

/// Feeds available out of the box: (name, homepage, feed URL).
const DEFAULT_SOURCES: [(&str, &str, &str); 9] = [
    ("GreenBiz", "https://www.greenbiz.com/", "https://rss.app/feeds/PfSPW1PZmIDrjC8u.xml"),
    ("Green.Earth", "https://www.green.earth", "https://rss.app/feeds/bovDvfqaIz2KoDdw.xml"),
    ("Sustainable Brands", "https://sustainablebrands.com/", "https://rss.app/feeds/qKjOEYXW4oEP6xYP.xml"),
    ("Carbon Credits", "https://carboncredits.com/", "https://rss.app/feeds/56HKOZAvi3Ym1tm7.xml"),
    ("Triple Pundit", "https://www.triplepundit.com/", "https://rss.app/feeds/uZLwiQhErv8b4yEK.xml"),
    ("ESG Today", "https://www.esgtoday.com/", "https://rss.app/feeds/K2enb0duBnv1BgXn.xml"),
    ("CoinDesk", "https://www.coindesk.com/", "https://rss.app/feeds/YqqGCKRoUgtzQxse.xml"),
    ("Forbes", "https://www.forbes.com/", "https://rss.app/feeds/AlOYwfMt50xeeAGX.xml"),
    (
        "PR Web",
        "https://www.prweb.com/releases/news-releases-list/",
        "https://rss.app/feeds/4zjgvZfHGaKwST6D.xml",
    ),
];

pub fn default_sources() -> Vec<Source> {
    DEFAULT_SOURCES
        .iter()
        .map(|(name, homepage, feed_url)| Source::new(name, homepage, feed_url))
        .collect()
}

pub fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

#[derive(Debug, Parser)]
#[command(name = "rss-digest", version, about = "Summarized RSS digests filtered by source and keyword")]
pub struct Args {
    /// JSON document holding articles, preferences and the read-later list
    #[arg(long, env = "DATA_FILE", default_value = "data.json")]
    pub data_file: PathBuf,

    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// HTML page served at /index
    #[arg(long, env = "INDEX_HTML", default_value = "static/index.html")]
    pub index_html: PathBuf,

    /// JSON list of sources replacing the built-in catalog
    #[arg(long, env = "SOURCES_FILE")]
    pub sources_file: Option<PathBuf>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-3.5-turbo")]
    pub model: String,

    /// Per-request timeout for feed and article fetches
    #[arg(long, env = "FETCH_TIMEOUT_SECONDS", default_value_t = 30)]
    pub timeout_seconds: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Scrape once, store new articles and print them as JSON
    Scrape {
        /// Source name to scrape; repeatable. Defaults to every source.
        #[arg(long = "source")]
        sources: Vec<String>,
    },
}

/// Everything the service needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sources: Vec<Source>,
    pub keywords: Vec<String>,
    pub fetch: FetchConfig,
    pub summarizer: SummarizerConfig,
    pub data_file: PathBuf,
    pub bind_addr: SocketAddr,
    pub index_html: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            keywords: default_keywords(),
            fetch: FetchConfig::default(),
            summarizer: SummarizerConfig::default(),
            data_file: PathBuf::from("data.json"),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            index_html: PathBuf::from("static/index.html"),
        }
    }
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let sources = match &args.sources_file {
            Some(path) => load_sources(path)?,
            None => default_sources(),
        };

        let fetch = FetchConfig {
            timeout_seconds: args.timeout_seconds,
            ..FetchConfig::default()
        };

        let summarizer = SummarizerConfig {
            api_key: args.openai_api_key.clone(),
            base_url: args.openai_base_url.clone(),
            model: args.model.clone(),
            ..SummarizerConfig::default()
        };

        Ok(Self {
            sources,
            keywords: default_keywords(),
            fetch,
            summarizer,
            data_file: args.data_file.clone(),
            bind_addr: args.bind,
            index_html: args.index_html.clone(),
        })
    }

    pub fn source(&self, name: &str) -> Option<&Source> {
        self.sources.iter().find(|source| source.name == name)
    }
}

/// Read a JSON array of sources. Names must be unique.
pub fn load_sources(path: &Path) -> Result<Vec<Source>> {
    let raw = std::fs::read_to_string(path)?;
    let sources: Vec<Source> = serde_json::from_str(&raw)?;

    for (i, source) in sources.iter().enumerate() {
        if sources[..i].iter().any(|other| other.name == source.name) {
            return Err(AggregatorError::Config(format!(
                "duplicate source name '{}' in {}",
                source.name,
                path.display()
            )));
        }
    }

    info!("Loaded {} sources from {}", sources.len(), path.display());
    Ok(sources)
}
