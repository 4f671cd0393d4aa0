use crate::captions::{extract_video_id, CaptionProvider, TranscriptFetcher};
use crate::models::ContentKind;
use crate::prompt::TextBudget;
use crate::scrape::PageScraper;
use std::sync::Arc;
use tracing::debug;

/// A transcript shorter than this is treated as unusable
const TRANSCRIPT_MIN_CHARS: usize = 100;

/// Scraped page text shorter than this is treated as unusable
const PAGE_TEXT_MIN_CHARS: usize = 50;

/// Decides, per content kind, how to obtain representative text for the
/// generative model. Infallible: delegated fetch failures degrade to
/// explanatory fallback text, never to an error.
pub struct TextExtractor {
    transcripts: TranscriptFetcher,
    scraper: PageScraper,
    budget: TextBudget,
}

impl TextExtractor {
    pub fn new(captions: Arc<dyn CaptionProvider>, budget: TextBudget) -> Self {
        Self {
            transcripts: TranscriptFetcher::new(captions, budget.transcript_chars),
            scraper: PageScraper::new(budget.page_text_chars),
            budget,
        }
    }

    pub async fn content_text(&self, link: &str, kind: ContentKind) -> String {
        match kind {
            ContentKind::Youtube => {
                let transcript = self.transcripts.fetch_transcript(link).await;
                if transcript.chars().count() > TRANSCRIPT_MIN_CHARS {
                    debug!(chars = transcript.len(), "Using video transcript");
                    format!("YouTube Video Transcript:\n\n{transcript}")
                } else {
                    debug!(url = %link, "No usable transcript; using fallback context");
                    captionless_fallback(link)
                }
            }

            ContentKind::Twitter
            | ContentKind::Instagram
            | ContentKind::Linkedin
            | ContentKind::Tiktok => format!(
                "This is a {kind} post. URL: {link}\n\
                 Please provide general insights about {kind} content based on the URL and \
                 typical content patterns on this platform."
            ),

            ContentKind::Link | ContentKind::Document => {
                let content = self.scraper.fetch_page(link).await;
                if content.chars().count() > PAGE_TEXT_MIN_CHARS {
                    content.chars().take(self.budget.context_chars).collect()
                } else {
                    format!(
                        "Content from: {link}\n\
                         Unable to fetch full content, but please provide insights based on the URL."
                    )
                }
            }

            // For notes, the link field holds the note body itself.
            ContentKind::Notes => link.to_string(),
        }
    }
}

fn captionless_fallback(link: &str) -> String {
    let video_id = extract_video_id(link);
    format!(
        "This is a YouTube video.\n\
         Title Context: Please note that this video does not have captions/transcripts available.\n\
         Video URL: {link}\n\
         Video ID: {id}\n\
         \n\
         Since I cannot access the video content directly, I can only provide general information \
         based on the video title and context you've provided. For a detailed analysis, please:\n\
         1. Enable captions on your YouTube video, or\n\
         2. Provide a brief description of the video content, or\n\
         3. Use videos that have auto-generated or manual captions available.\n\
         \n\
         Note: Gemini AI (free tier) cannot extract audio, scenes, or visual content from videos. \
         It can only analyze text-based transcripts when available.",
        id = video_id.as_deref().unwrap_or("unknown"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captions::CaptionSegment;
    use crate::error::StashError;
    use async_trait::async_trait;

    struct FixedCaptions(Vec<CaptionSegment>);

    #[async_trait]
    impl CaptionProvider for FixedCaptions {
        async fn fetch_captions(
            &self,
            _video_id: &str,
        ) -> Result<Vec<CaptionSegment>, StashError> {
            Ok(self.0.clone())
        }
    }

    struct NoCaptions;

    #[async_trait]
    impl CaptionProvider for NoCaptions {
        async fn fetch_captions(
            &self,
            _video_id: &str,
        ) -> Result<Vec<CaptionSegment>, StashError> {
            Err(StashError::FetchError("video has no caption tracks".into()))
        }
    }

    fn extractor(provider: impl CaptionProvider + 'static) -> TextExtractor {
        TextExtractor::new(Arc::new(provider), TextBudget::default())
    }

    fn long_segment() -> CaptionSegment {
        CaptionSegment {
            text: "word ".repeat(50),
            start_secs: 0.0,
            duration_secs: 1.0,
        }
    }

    #[tokio::test]
    async fn notes_pass_through_verbatim() {
        let extractor = extractor(NoCaptions);
        assert_eq!(
            extractor.content_text("Buy milk", ContentKind::Notes).await,
            "Buy milk"
        );
        assert_eq!(
            extractor
                .content_text("multi\nline\nnote", ContentKind::Notes)
                .await,
            "multi\nline\nnote"
        );
    }

    #[tokio::test]
    async fn social_kinds_use_platform_template() {
        let extractor = extractor(NoCaptions);
        let text = extractor
            .content_text("https://twitter.com/someone/status/1", ContentKind::Twitter)
            .await;
        assert!(text.starts_with("This is a twitter post."));
        assert!(text.contains("https://twitter.com/someone/status/1"));

        let text = extractor
            .content_text("https://tiktok.com/@x/video/2", ContentKind::Tiktok)
            .await;
        assert!(text.contains("tiktok content"));
    }

    #[tokio::test]
    async fn youtube_with_transcript_is_prefixed() {
        let extractor = extractor(FixedCaptions(vec![long_segment()]));
        let text = extractor
            .content_text("https://youtu.be/abcdefghijk", ContentKind::Youtube)
            .await;
        assert!(text.starts_with("YouTube Video Transcript:\n\n"));
        assert!(text.contains("word word"));
    }

    #[tokio::test]
    async fn captionless_video_gets_explanatory_fallback() {
        let extractor = extractor(NoCaptions);
        let text = extractor
            .content_text("https://youtu.be/abcdefghijk", ContentKind::Youtube)
            .await;
        assert!(text.contains("does not have captions"));
        assert!(text.contains("Video ID: abcdefghijk"));
        assert!(text.contains("https://youtu.be/abcdefghijk"));
    }

    #[tokio::test]
    async fn short_transcript_is_treated_as_missing() {
        let extractor = extractor(FixedCaptions(vec![CaptionSegment {
            text: "too short".into(),
            start_secs: 0.0,
            duration_secs: 1.0,
        }]));
        let text = extractor
            .content_text("https://youtu.be/abcdefghijk", ContentKind::Youtube)
            .await;
        assert!(text.contains("does not have captions"));
    }

    #[tokio::test]
    async fn unreachable_link_gets_url_fallback() {
        let extractor = extractor(NoCaptions);
        let text = extractor
            .content_text("http://127.0.0.1:1/article", ContentKind::Link)
            .await;
        assert!(text.starts_with("Content from: http://127.0.0.1:1/article"));
        assert!(text.contains("Unable to fetch full content"));
    }
}
