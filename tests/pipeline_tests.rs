//! Pipeline composition tests: scripted captions feeding the real
//! extraction and prompt-assembly stages, asserting on the prompts the
//! model ends up receiving.

use async_trait::async_trait;
use brainstash::captions::{CaptionProvider, CaptionSegment};
use brainstash::error::StashError;
use brainstash::models::{ContentItem, ContentKind};
use brainstash::{Assistant, ScriptedProvider, TextBudget};
use std::sync::Arc;
use uuid::Uuid;

struct FixedCaptions(Vec<CaptionSegment>);

#[async_trait]
impl CaptionProvider for FixedCaptions {
    async fn fetch_captions(&self, _video_id: &str) -> Result<Vec<CaptionSegment>, StashError> {
        Ok(self.0.clone())
    }
}

struct NoCaptions;

#[async_trait]
impl CaptionProvider for NoCaptions {
    async fn fetch_captions(&self, _video_id: &str) -> Result<Vec<CaptionSegment>, StashError> {
        Err(StashError::FetchError("video has no caption tracks".into()))
    }
}

fn segment(text: &str) -> CaptionSegment {
    CaptionSegment {
        text: text.to_string(),
        start_secs: 0.0,
        duration_secs: 2.0,
    }
}

fn youtube_item(link: &str) -> ContentItem {
    ContentItem::new(
        "A talk".into(),
        link.into(),
        ContentKind::Youtube,
        vec![],
        Uuid::new_v4(),
    )
}

fn assistant(
    captions: impl CaptionProvider + 'static,
    provider: Arc<ScriptedProvider>,
    budget: TextBudget,
) -> Assistant {
    Assistant::new(Arc::new(captions), provider, budget)
}

#[tokio::test]
async fn transcript_segments_are_joined_and_collapsed() {
    let sentence = "the quick brown fox jumps over the lazy dog";
    let captions = FixedCaptions(vec![
        segment(&format!("{sentence} ")),
        segment(&format!(" {sentence}")),
        segment(sentence),
    ]);
    let provider = Arc::new(ScriptedProvider::new("fine"));
    let assistant = assistant(captions, provider.clone(), TextBudget::default());

    let item = youtube_item("https://www.youtube.com/watch?v=abcdefghijk");
    assistant.summarize(&item).await.unwrap();

    let prompts = provider.prompts();
    let expected = format!(
        "YouTube Video Transcript:\n\n{sentence} {sentence} {sentence}"
    );
    assert!(prompts[0].contains(&expected));
    assert!(prompts[0].contains("titled \"A talk\""));
}

#[tokio::test]
async fn captionless_videos_get_the_fallback_context() {
    let provider = Arc::new(ScriptedProvider::new("fine"));
    let assistant = assistant(NoCaptions, provider.clone(), TextBudget::default());

    let item = youtube_item("https://youtu.be/abcdefghijk");
    assistant.summarize(&item).await.unwrap();

    let prompts = provider.prompts();
    assert!(prompts[0].contains("does not have captions"));
    assert!(prompts[0].contains("Video URL: https://youtu.be/abcdefghijk"));
    assert!(prompts[0].contains("Video ID: abcdefghijk"));
}

#[tokio::test]
async fn transcript_budget_bounds_the_prompt() {
    let captions = FixedCaptions(vec![segment(&"x".repeat(300))]);
    let provider = Arc::new(ScriptedProvider::new("fine"));
    let budget = TextBudget {
        transcript_chars: 120,
        ..TextBudget::default()
    };
    let assistant = assistant(captions, provider.clone(), budget);

    let item = youtube_item("https://youtu.be/abcdefghijk");
    assistant.summarize(&item).await.unwrap();

    let prompts = provider.prompts();
    let capped = format!("YouTube Video Transcript:\n\n{}", "x".repeat(120));
    assert!(prompts[0].contains(&capped));
    assert!(!prompts[0].contains(&"x".repeat(121)));
}

#[tokio::test]
async fn note_bodies_flow_into_question_prompts() {
    let provider = Arc::new(ScriptedProvider::new("Milk."));
    let assistant = assistant(NoCaptions, provider.clone(), TextBudget::default());

    let item = ContentItem::new(
        "Groceries".into(),
        "Buy milk and eggs".into(),
        ContentKind::Notes,
        vec![],
        Uuid::new_v4(),
    );
    let answer = assistant
        .answer(&item, "What should I buy?")
        .await
        .unwrap();
    assert_eq!(answer, "Milk.");

    let prompts = provider.prompts();
    assert!(prompts[0].contains("\n\nBuy milk and eggs\n\n"));
    assert!(prompts[0].contains("Please answer this question: What should I buy?"));
    assert!(prompts[0].ends_with("Answer:"));
}
