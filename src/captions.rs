use crate::error::StashError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use url::Url;

static VIDEO_ID_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([a-zA-Z0-9_-]{11})")
            .unwrap(),
        Regex::new(r"youtube\.com/watch\?.*v=([a-zA-Z0-9_-]{11})").unwrap(),
    ]
});

/// Extract the 11-character video ID from the common YouTube URL shapes.
/// Patterns are tried in order; the first capture wins.
pub fn extract_video_id(url: &str) -> Option<String> {
    for pattern in VIDEO_ID_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(url) {
            if let Some(id) = captures.get(1) {
                return Some(id.as_str().to_string());
            }
        }
    }
    None
}

/// One timed caption line as served by the captioning source
#[derive(Debug, Clone)]
pub struct CaptionSegment {
    pub text: String,
    pub start_secs: f64,
    pub duration_secs: f64,
}

/// Source of timed captions for a video ID
#[async_trait]
pub trait CaptionProvider: Send + Sync {
    async fn fetch_captions(&self, video_id: &str) -> Result<Vec<CaptionSegment>, StashError>;
}

#[derive(Debug, Deserialize)]
struct CaptionMetadata {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct TracklistRenderer {
    #[serde(rename = "captionTracks", default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Json3Transcript {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(rename = "tStartMs", default)]
    t_start_ms: u64,
    #[serde(rename = "dDurationMs", default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Caption provider backed by YouTube's public watch pages: reads the
/// player's caption-track list out of the page, then fetches the first
/// track in JSON3 form.
pub struct YoutubeCaptions {
    client: Client,
    base_url: String,
}

impl Default for YoutubeCaptions {
    fn default() -> Self {
        Self::new()
    }
}

impl YoutubeCaptions {
    pub fn new() -> Self {
        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|e| {
                panic!("Failed to initialize HTTP client: {}", e);
            });
        Self {
            client,
            base_url: "https://www.youtube.com".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_text(&self, url: &str) -> Result<String, StashError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StashError::FetchError(e.to_string()))?;
        if !response.status().is_success() {
            return Err(StashError::FetchError(format!(
                "unexpected status {} from {}",
                response.status(),
                url
            )));
        }
        response
            .text()
            .await
            .map_err(|e| StashError::FetchError(e.to_string()))
    }
}

/// Pull the caption-track list out of a watch page. The player config is
/// embedded as JSON between the `"captions":` key and the following
/// `"videoDetails"` key.
fn parse_track_list(page: &str) -> Result<Vec<CaptionTrack>, StashError> {
    let start = page
        .find("\"captions\":")
        .ok_or_else(|| StashError::FetchError("no caption metadata on watch page".into()))?;
    let rest = &page[start + "\"captions\":".len()..];
    let end = rest
        .find(",\"videoDetails\"")
        .ok_or_else(|| StashError::FetchError("malformed player config".into()))?;

    let metadata: CaptionMetadata = serde_json::from_str(rest[..end].trim())?;
    let tracks = metadata
        .renderer
        .map(|r| r.caption_tracks)
        .unwrap_or_default();
    if tracks.is_empty() {
        return Err(StashError::FetchError("video has no caption tracks".into()));
    }
    Ok(tracks)
}

fn parse_json3(raw: &str) -> Result<Vec<CaptionSegment>, StashError> {
    let transcript: Json3Transcript = serde_json::from_str(raw)?;
    let segments = transcript
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            if text.trim().is_empty() {
                return None;
            }
            Some(CaptionSegment {
                text,
                start_secs: event.t_start_ms as f64 / 1000.0,
                duration_secs: event.d_duration_ms as f64 / 1000.0,
            })
        })
        .collect();
    Ok(segments)
}

#[async_trait]
impl CaptionProvider for YoutubeCaptions {
    #[instrument(level = "debug", skip(self), err)]
    async fn fetch_captions(&self, video_id: &str) -> Result<Vec<CaptionSegment>, StashError> {
        let watch_url = format!("{}/watch?v={}", self.base_url, video_id);
        let page = self.fetch_text(&watch_url).await?;

        let tracks = parse_track_list(&page)?;
        let mut track_url = Url::parse(&tracks[0].base_url)?;
        track_url.query_pairs_mut().append_pair("fmt", "json3");

        let raw = self.fetch_text(track_url.as_str()).await?;
        let segments = parse_json3(&raw)?;
        debug!(
            video_id = %video_id,
            segments = segments.len(),
            "Fetched caption track"
        );
        Ok(segments)
    }
}

/// Turns a video URL into one flat transcript string, bounded by the given
/// character budget. Every failure degrades to an empty string; callers
/// treat "no transcript" and "transcript fetch failed" identically.
pub struct TranscriptFetcher {
    provider: Arc<dyn CaptionProvider>,
    max_chars: usize,
}

impl TranscriptFetcher {
    pub fn new(provider: Arc<dyn CaptionProvider>, max_chars: usize) -> Self {
        Self {
            provider,
            max_chars,
        }
    }

    pub async fn fetch_transcript(&self, url: &str) -> String {
        let Some(video_id) = extract_video_id(url) else {
            debug!(url = %url, "Could not extract video ID from URL");
            return String::new();
        };

        let segments = match self.provider.fetch_captions(&video_id).await {
            Ok(segments) => segments,
            Err(e) => {
                warn!(video_id = %video_id, error = %e, "Transcript fetch failed");
                return String::new();
            }
        };
        if segments.is_empty() {
            debug!(video_id = %video_id, "No transcript available for this video");
            return String::new();
        }

        let joined = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let collapsed = joined.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed.chars().take(self.max_chars).collect()
    }
}
