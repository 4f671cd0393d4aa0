use super::AppState;
use crate::auth::AuthContext;
use crate::error::{ApiError, FieldError};
use crate::models::{ContentItem, ContentKind};
use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateContentRequest {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Serialize)]
pub struct CreateContentResponse {
    message: String,
    #[serde(rename = "contentId")]
    content_id: Uuid,
}

#[derive(Serialize)]
pub struct ContentListResponse {
    content: Vec<ContentView>,
}

/// Wire shape of a listed item; the owner reference is expanded so clients
/// can render the username without a second request.
#[derive(Serialize)]
pub struct ContentView {
    id: Uuid,
    title: String,
    link: String,
    #[serde(rename = "type")]
    kind: ContentKind,
    tags: Vec<String>,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
    #[serde(rename = "userId")]
    owner: OwnerView,
}

#[derive(Serialize)]
pub struct OwnerView {
    id: Uuid,
    username: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteContentRequest {
    #[serde(rename = "contentId")]
    content_id: Option<String>,
}

fn validate_create(req: &CreateContentRequest) -> Result<(String, String, ContentKind), ApiError> {
    let mut errors = Vec::new();

    match &req.title {
        Some(title) if !title.is_empty() => {}
        _ => errors.push(FieldError::new("title", "Title is required")),
    }
    match &req.link {
        Some(link) if !link.is_empty() => {}
        _ => errors.push(FieldError::new("link", "Link is required")),
    }
    let kind = match req.kind.as_deref().map(str::parse::<ContentKind>) {
        Some(Ok(kind)) => Some(kind),
        Some(Err(())) => {
            errors.push(FieldError::new("type", "Invalid content type"));
            None
        }
        None => {
            errors.push(FieldError::new("type", "Required"));
            None
        }
    };

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    Ok((
        req.title.clone().unwrap_or_default(),
        req.link.clone().unwrap_or_default(),
        kind.unwrap_or(ContentKind::Link),
    ))
}

pub async fn create_content(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateContentRequest>,
) -> Result<(StatusCode, Json<CreateContentResponse>), ApiError> {
    let (title, link, kind) = validate_create(&req)?;

    let item = ContentItem::new(title, link, kind, req.tags, auth.user_id);
    state.store.insert_content(&item)?;

    info!(content_id = %item.id, kind = %item.kind, "Content added");
    Ok((
        StatusCode::CREATED,
        Json(CreateContentResponse {
            message: "Content added".into(),
            content_id: item.id,
        }),
    ))
}

pub async fn list_content(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ContentListResponse>, ApiError> {
    let user = state
        .store
        .get_user(auth.user_id)?
        .ok_or_else(|| ApiError::Forbidden("Invalid or expired token".into()))?;

    let content = state
        .store
        .list_content(auth.user_id)?
        .into_iter()
        .map(|item| ContentView {
            id: item.id,
            title: item.title,
            link: item.link,
            kind: item.kind,
            tags: item.tags,
            created_at: item.created_at,
            owner: OwnerView {
                id: user.id,
                username: user.username.clone(),
            },
        })
        .collect();

    Ok(Json(ContentListResponse { content }))
}

pub async fn delete_content(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<DeleteContentRequest>,
) -> Result<Json<super::MessageResponse>, ApiError> {
    let content_id = req
        .content_id
        .ok_or_else(|| ApiError::BadRequest("Content ID is required".into()))?;

    // An ID that is not even a UUID cannot name any stored item.
    let content_id = content_id
        .parse::<Uuid>()
        .map_err(|_| ApiError::NotFound("Content not found".into()))?;

    if !state.store.delete_content(auth.user_id, content_id)? {
        return Err(ApiError::NotFound("Content not found".into()));
    }

    info!(content_id = %content_id, "Content deleted");
    Ok(Json(super::MessageResponse::new(
        "Content deleted successfully",
    )))
}
