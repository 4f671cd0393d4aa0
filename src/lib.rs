pub mod api;
pub mod assist;
pub mod auth;
pub mod captions;
pub mod config;
pub mod error;
pub mod extract;
pub mod llm;
pub mod logging;
pub mod models;
pub mod prompt;
pub mod scrape;
pub mod store;

pub use assist::Assistant;
pub use auth::TokenService;
pub use captions::{CaptionProvider, TranscriptFetcher, YoutubeCaptions};
pub use config::AppConfig;
pub use error::{ApiError, FieldError, StashError};
pub use extract::TextExtractor;
pub use llm::{GeminiProvider, GenerativeProvider, ScriptedProvider};
pub use logging::{setup_logging, LogConfig};
pub use models::{ContentItem, ContentKind, ShareLink, User};
pub use prompt::TextBudget;
pub use scrape::PageScraper;
pub use store::Store;

use api::AppState;
use axum::http::{header, HeaderValue, Method};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Bring up the full service: storage, token signing, the optional
/// generative assistant, and the HTTP listener. Runs until the listener
/// fails or the process is killed.
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;

    let store = Arc::new(Store::open(&config.storage.data_dir)?);

    let secret = config
        .auth
        .jwt_secret
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("No JWT secret configured"))?;
    let tokens = Arc::new(TokenService::new(secret, config.auth.token_ttl_days));

    let assistant = config.gemini.api_key.clone().map(|key| {
        let provider = GeminiProvider::new(key)
            .with_model(config.gemini.model.clone())
            .with_endpoint(config.gemini.endpoint.clone());
        Arc::new(Assistant::new(
            Arc::new(YoutubeCaptions::new()),
            Arc::new(provider),
            TextBudget::default(),
        ))
    });

    let state = AppState {
        store,
        tokens,
        assistant,
    };

    // The frontend sends credentialed requests, so the origin must be
    // named explicitly rather than reflected.
    let cors = CorsLayer::new()
        .allow_origin(config.server.frontend_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    let app = api::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app).await?;

    Ok(())
}
