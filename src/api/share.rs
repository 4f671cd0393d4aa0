use super::{AppState, MessageResponse};
use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::models::ContentItem;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use tracing::info;

const SHARE_HASH_LEN: usize = 10;

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    #[serde(default)]
    share: bool,
}

#[derive(Serialize)]
pub struct ShareResponse {
    hash: String,
}

#[derive(Serialize)]
pub struct SharedBrainResponse {
    username: String,
    content: Vec<ContentItem>,
}

fn random_hash() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SHARE_HASH_LEN)
        .map(char::from)
        .collect()
}

/// Opt in or out of sharing. Opting in returns the active hash, creating
/// one if needed; opting out revokes it.
pub async fn set_share(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ShareRequest>,
) -> Result<Response, ApiError> {
    if req.share {
        let share = state.store.ensure_share(auth.user_id, random_hash)?;
        info!(hash = %share.hash, "Share link active");
        Ok(Json(ShareResponse { hash: share.hash }).into_response())
    } else {
        state.store.delete_share(auth.user_id)?;
        info!("Share link removed");
        Ok(Json(MessageResponse::new("Removed link")).into_response())
    }
}

/// Public view of a shared collection. No authentication: knowing the hash
/// is the capability.
pub async fn shared_brain(
    State(state): State<AppState>,
    Path(share_hash): Path<String>,
) -> Result<Json<SharedBrainResponse>, ApiError> {
    let link = state
        .store
        .find_share(&share_hash)?
        .ok_or_else(|| ApiError::ShareNotFound("Sorry incorrect input".into()))?;

    let user = state.store.get_user(link.user_id)?.ok_or_else(|| {
        ApiError::ShareNotFound("user not found, error should ideally not happen".into())
    })?;

    let content = state.store.list_content(link.user_id)?;

    Ok(Json(SharedBrainResponse {
        username: user.username,
        content,
    }))
}
