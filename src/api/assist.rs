use super::AppState;
use crate::assist::Assistant;
use crate::auth::AuthContext;
use crate::error::{ApiError, StashError};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    #[serde(rename = "contentId")]
    content_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    #[serde(rename = "contentId")]
    content_id: Option<String>,
    question: Option<String>,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    summary: String,
}

#[derive(Serialize)]
pub struct AnswerResponse {
    answer: String,
}

#[derive(Serialize)]
pub struct InsightsResponse {
    insights: String,
}

fn assistant(state: &AppState) -> Result<&Arc<Assistant>, ApiError> {
    state.assistant.as_ref().ok_or_else(|| {
        StashError::NotConfigured("Assistant is not configured; set GEMINI_API_KEY".into()).into()
    })
}

fn parse_content_id(raw: Option<String>) -> Result<Uuid, ApiError> {
    let raw = raw.ok_or_else(|| ApiError::BadRequest("Content ID is required".into()))?;
    raw.parse::<Uuid>()
        .map_err(|_| ApiError::NotFound("Content not found".into()))
}

pub async fn summarize_content(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let assistant = assistant(&state)?;
    let content_id = parse_content_id(req.content_id)?;

    let item = state
        .store
        .get_content(auth.user_id, content_id)?
        .ok_or_else(|| ApiError::NotFound("Content not found".into()))?;

    let summary = assistant.summarize(&item).await?;
    Ok(Json(SummaryResponse { summary }))
}

pub async fn ask_question(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<QuestionRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let assistant = assistant(&state)?;
    let content_id = parse_content_id(req.content_id)?;
    let question = match req.question {
        Some(q) if !q.trim().is_empty() => q,
        _ => return Err(ApiError::BadRequest("Question is required".into())),
    };

    let item = state
        .store
        .get_content(auth.user_id, content_id)?
        .ok_or_else(|| ApiError::NotFound("Content not found".into()))?;

    let answer = assistant.answer(&item, &question).await?;
    Ok(Json(AnswerResponse { answer }))
}

pub async fn collection_insights(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<InsightsResponse>, ApiError> {
    let assistant = assistant(&state)?;
    let items = state.store.list_content(auth.user_id)?;

    let insights = assistant.insights(&items).await?;
    Ok(Json(InsightsResponse { insights }))
}
