use anyhow::Context;
use clap::Parser;
use rss_digest::config::{Args, Command};
use rss_digest::{
    create_router, AppConfig, DigestService, JsonFileStore, MockLlmAdapter, RssAggregator, Summarizer,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = AppConfig::from_args(&args)?;

    info!("Starting RSS digest ({} sources configured)", config.sources.len());

    let summarizer = if config.summarizer.api_key.is_some() {
        Summarizer::openai(config.summarizer.clone())?
    } else {
        warn!("OPENAI_API_KEY is not set; every summary will be a placeholder");
        let adapter = MockLlmAdapter::new("unconfigured".to_string()).failing("no API key configured");
        Summarizer::new(Arc::new(adapter), config.summarizer.clone())
    };

    let aggregator = RssAggregator::new(config.fetch.clone(), summarizer)?;
    let store = Arc::new(
        JsonFileStore::open(&config.data_file)
            .await
            .with_context(|| format!("opening store {}", config.data_file.display()))?,
    );
    let service = Arc::new(DigestService::new(config.clone(), aggregator, store));

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            match service.refresh().await {
                Ok(count) => info!("Startup refresh stored {} new articles", count),
                Err(e) => error!("Startup refresh failed: {}", e),
            }

            let listener = tokio::net::TcpListener::bind(config.bind_addr)
                .await
                .with_context(|| format!("binding {}", config.bind_addr))?;
            info!("Listening on http://{}", listener.local_addr()?);

            axum::serve(listener, create_router(service)).await?;
        }
        Command::Scrape { sources } => {
            let selected = if sources.is_empty() {
                config.sources.clone()
            } else {
                service.selected_sources(&sources)
            };

            let articles = service.scrape_and_store(&selected).await?;
            println!("{}", serde_json::to_string_pretty(&articles)?);
        }
    }

    Ok(())
}
