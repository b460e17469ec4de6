use crate::llm_adapter::{ChatMessage, ChatRequest, LlmAdapter, OpenAiAdapter};
use crate::text::truncate_chars;
use crate::types::{Result, SummarizerConfig, SUMMARY_ERROR_SENTINEL};
use std::sync::Arc;
use tracing::{debug, error, info};

const SUMMARY_INSTRUCTION: &str = "Please summarize the following article content in 2-3 sentences:";

/// Produces short article summaries through a language model.
#[derive(Clone)]
pub struct Summarizer {
    adapter: Arc<dyn LlmAdapter>,
    config: SummarizerConfig,
}

impl Summarizer {
    pub fn new(adapter: Arc<dyn LlmAdapter>, config: SummarizerConfig) -> Self {
        info!("Using summarizer backend: {}", adapter.adapter_name());
        Self { adapter, config }
    }

    /// Summarizer backed by the OpenAI-compatible endpoint in `config`.
    pub fn openai(config: SummarizerConfig) -> Result<Self> {
        let adapter = OpenAiAdapter::new(&config)?;
        Ok(Self::new(Arc::new(adapter), config))
    }

    /// Chat request for `content`, cut to the configured input length.
    pub fn build_request(&self, content: &str) -> ChatRequest {
        let truncated = truncate_chars(content, self.config.max_input_chars);

        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(self.config.system_prompt.clone()),
                ChatMessage::user(format!("{}\n\n{}", SUMMARY_INSTRUCTION, truncated)),
            ],
            max_tokens: self.config.max_tokens,
        }
    }

    pub async fn try_summarize(&self, content: &str) -> Result<String> {
        let request = self.build_request(content);
        debug!(
            "Requesting summary for {} chars of content",
            content.chars().count().min(self.config.max_input_chars)
        );
        self.adapter.complete(&request).await
    }

    /// Summarize `content`. Model failures are logged and yield the
    /// placeholder summary instead of an error.
    pub async fn summarize(&self, content: &str) -> String {
        match self.try_summarize(content).await {
            Ok(summary) => {
                info!("Summary generated: {}...", truncate_chars(&summary, 50));
                summary
            }
            Err(e) => {
                error!("Error in summarization: {}", e);
                SUMMARY_ERROR_SENTINEL.to_string()
            }
        }
    }
}
