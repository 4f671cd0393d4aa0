//! Webpage text extraction for the summarization pipeline.
//!
//! Uses reqwest for fetching and scraper for HTML parsing.

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Browser-like User-Agent; many sites serve stripped-down or empty pages
/// to obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Timeout for page fetches
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Elements whose subtrees carry no readable content
const SKIPPED_ELEMENTS: [&str; 5] = ["script", "style", "nav", "footer", "noscript"];

/// Containers tried in order; the first with non-empty text wins
const CONTENT_SELECTORS: [&str; 3] = ["article", "main", "body"];

/// Fetches pages and reduces them to bounded plain text. Every failure
/// (bad URL, network, status, parse) degrades to an empty string.
pub struct PageScraper {
    client: Client,
    max_chars: usize,
}

impl PageScraper {
    pub fn new(max_chars: usize) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|e| {
                panic!("Failed to initialize HTTP client: {}", e);
            });
        Self { client, max_chars }
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_page(&self, url: &str) -> String {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(url = %url, error = %e, "Not a fetchable URL");
                return String::new();
            }
        };

        let response = match self.client.get(parsed).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "Page fetch failed");
                return String::new();
            }
        };
        if !response.status().is_success() {
            warn!(url = %url, status = %response.status(), "Page fetch returned an error status");
            return String::new();
        }

        let html = match response.text().await {
            Ok(html) => html,
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to read page body");
                return String::new();
            }
        };

        let text = extract_main_text(&html, self.max_chars);
        debug!(url = %url, content_length = text.len(), "Extracted page text");
        text
    }
}

/// Reduce an HTML document to readable text: drop script/style/nav/footer
/// subtrees, take the first non-empty of `article`, `main`, `body`,
/// collapse whitespace, and cap the result at `max_chars` characters.
pub fn extract_main_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);

    for selector_str in CONTENT_SELECTORS {
        let selector = Selector::parse(selector_str).unwrap();
        let mut raw = String::new();
        for element in document.select(&selector) {
            collect_text(element, &mut raw);
        }

        let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if !cleaned.is_empty() {
            return cleaned.chars().take(max_chars).collect();
        }
    }

    String::new()
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    if SKIPPED_ELEMENTS.contains(&element.value().name()) {
        return;
    }
    for node in element.children() {
        if let Some(text) = node.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(child) = ElementRef::wrap(node) {
            collect_text(child, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_article_over_body() {
        let html = r#"
            <html><body>
                <nav>Home About Contact</nav>
                <article>The actual story text.</article>
                <footer>Copyright</footer>
            </body></html>
        "#;
        assert_eq!(extract_main_text(html, 5_000), "The actual story text.");
    }

    #[test]
    fn falls_back_to_main_then_body() {
        let html = "<html><body><main>Main region text</main></body></html>";
        assert_eq!(extract_main_text(html, 5_000), "Main region text");

        let html = "<html><body><p>Just body text</p></body></html>";
        assert_eq!(extract_main_text(html, 5_000), "Just body text");
    }

    #[test]
    fn skips_script_style_and_chrome() {
        let html = r#"
            <html><body>
                <script>var tracking = true;</script>
                <style>p { color: red }</style>
                <nav>menu items</nav>
                <p>Visible   paragraph
                text</p>
                <footer>footer junk</footer>
            </body></html>
        "#;
        assert_eq!(extract_main_text(html, 5_000), "Visible paragraph text");
    }

    #[test]
    fn output_is_bounded() {
        let html = format!("<html><body><p>{}</p></body></html>", "x".repeat(20_000));
        let text = extract_main_text(&html, 5_000);
        assert_eq!(text.chars().count(), 5_000);
    }

    #[test]
    fn empty_document_yields_empty_string() {
        assert_eq!(extract_main_text("", 5_000), "");
        assert_eq!(
            extract_main_text("<html><body><script>only()</script></body></html>", 5_000),
            ""
        );
    }

    #[tokio::test]
    async fn unfetchable_urls_degrade_to_empty() {
        let scraper = PageScraper::new(5_000);
        assert_eq!(scraper.fetch_page("not a url at all").await, "");
        // Nothing listens here; connection is refused immediately.
        assert_eq!(scraper.fetch_page("http://127.0.0.1:1/").await, "");
    }
}
