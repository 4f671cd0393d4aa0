use crate::captions::CaptionProvider;
use crate::error::StashError;
use crate::extract::TextExtractor;
use crate::llm::GenerativeProvider;
use crate::models::ContentItem;
use crate::prompt::{insights_prompt, question_prompt, summary_prompt, TextBudget};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Request-scoped orchestration of the summarization pipeline:
/// classify, fetch or scrape, assemble, generate. Each call is one strictly
/// sequential awaited chain; extraction failures have already degraded to
/// fallback text by the time a prompt is built, while generation failures
/// propagate to the caller.
pub struct Assistant {
    extractor: TextExtractor,
    provider: Arc<dyn GenerativeProvider>,
}

impl Assistant {
    pub fn new(
        captions: Arc<dyn CaptionProvider>,
        provider: Arc<dyn GenerativeProvider>,
        budget: TextBudget,
    ) -> Self {
        Self {
            extractor: TextExtractor::new(captions, budget),
            provider,
        }
    }

    #[instrument(level = "info", skip(self, item), fields(title = %item.title, kind = %item.kind))]
    pub async fn summarize(&self, item: &ContentItem) -> Result<String, StashError> {
        info!(provider = self.provider.name(), "Summarize request");

        let content_text = self.extractor.content_text(&item.link, item.kind).await;
        debug!(chars = content_text.len(), "Assembled content text");

        let prompt = summary_prompt(&item.title, &content_text);
        self.provider.generate(prompt).await
    }

    #[instrument(level = "info", skip(self, item, question), fields(title = %item.title, kind = %item.kind))]
    pub async fn answer(&self, item: &ContentItem, question: &str) -> Result<String, StashError> {
        info!(provider = self.provider.name(), "Question request");

        let content_text = self.extractor.content_text(&item.link, item.kind).await;
        debug!(chars = content_text.len(), "Assembled content text");

        let prompt = question_prompt(&item.title, &content_text, question);
        self.provider.generate(prompt).await
    }

    #[instrument(level = "info", skip(self, items), fields(items = items.len()))]
    pub async fn insights(&self, items: &[ContentItem]) -> Result<String, StashError> {
        info!(provider = self.provider.name(), "Insights request");

        let prompt = insights_prompt(items);
        self.provider.generate(prompt).await
    }
}
