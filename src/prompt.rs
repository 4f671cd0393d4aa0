//! Prompt assembly for the generative model.
//!
//! All character budgets used upstream by the extraction stages live here,
//! so there is exactly one place that decides how much text a prompt may
//! carry.

use crate::models::ContentItem;

pub const TRANSCRIPT_MAX_CHARS: usize = 15_000;
pub const PAGE_TEXT_MAX_CHARS: usize = 5_000;
pub const CONTEXT_MAX_CHARS: usize = 10_000;

/// Character budgets for the text that flows into a prompt
#[derive(Debug, Clone, Copy)]
pub struct TextBudget {
    /// Cap on a fetched video transcript
    pub transcript_chars: usize,
    /// Cap on scraped page text
    pub page_text_chars: usize,
    /// Cap on the assembled context block for link/document items
    pub context_chars: usize,
}

impl Default for TextBudget {
    fn default() -> Self {
        Self {
            transcript_chars: TRANSCRIPT_MAX_CHARS,
            page_text_chars: PAGE_TEXT_MAX_CHARS,
            context_chars: CONTEXT_MAX_CHARS,
        }
    }
}

pub fn summary_prompt(title: &str, content_text: &str) -> String {
    format!(
        "Please provide a concise and informative summary of the following content titled \"{title}\":\n\
         \n\
         {content_text}\n\
         \n\
         Provide a helpful and structured summary. If the content indicates that video transcripts \
         or full content are not available, acknowledge this limitation and provide whatever \
         insights are possible based on the title, URL, and context provided.\n\
         \n\
         Summary:"
    )
}

pub fn question_prompt(title: &str, content_text: &str, question: &str) -> String {
    format!(
        "Based on the following content titled \"{title}\":\n\
         \n\
         {content_text}\n\
         \n\
         Please answer this question: {question}\n\
         \n\
         Even if you cannot access the full content, provide a helpful answer based on the title, \
         URL, and available information.\n\
         \n\
         Answer:"
    )
}

pub fn insights_prompt(items: &[ContentItem]) -> String {
    let content_list = items
        .iter()
        .enumerate()
        .map(|(index, item)| format!("{}. {} ({}): {}", index + 1, item.title, item.kind, item.link))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Based on this collection of saved content:\n\
         \n\
         {content_list}\n\
         \n\
         Please provide:\n\
         1. Key themes and topics\n\
         2. Interesting connections between the items\n\
         3. Suggestions for related content to explore\n\
         \n\
         Insights:"
    )
}
