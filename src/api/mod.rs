//! HTTP surface: routing, shared state, and the wire-level handlers.

pub mod assist;
pub mod content;
pub mod health;
pub mod share;
pub mod users;

use crate::assist::Assistant;
use crate::auth::{auth_middleware, TokenService};
use crate::store::Store;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Extension, Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub tokens: Arc<TokenService>,
    /// Absent when no generative API key is configured; the `ai` routes
    /// then answer 503.
    pub assistant: Option<Arc<Assistant>>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Build the application router. CORS and request tracing are layered on
/// by the caller, which owns the server configuration.
pub fn router(state: AppState) -> Router {
    let authed_routes = Router::new()
        .route(
            "/api/v1/content",
            post(content::create_content)
                .get(content::list_content)
                .delete(content::delete_content),
        )
        .route("/api/v1/brain/share", post(share::set_share))
        .route("/api/v1/ai/summarize", post(assist::summarize_content))
        .route("/api/v1/ai/question", post(assist::ask_question))
        .route("/api/v1/ai/insights", post(assist::collection_insights))
        .layer(axum_middleware::from_fn(auth_middleware))
        .layer(Extension(state.tokens.clone()));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/signup", post(users::signup))
        .route("/api/v1/signin", post(users::signin))
        .route("/api/v1/brain/:share_hash", get(share::shared_brain))
        .merge(authed_routes)
        .with_state(state)
}
