use super::{AppState, MessageResponse};
use crate::auth::{hash_password, verify_password};
use crate::error::{ApiError, FieldError};
use crate::models::User;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

const USERNAME_MIN_CHARS: usize = 3;
const USERNAME_MAX_CHARS: usize = 20;
const PASSWORD_MIN_CHARS: usize = 6;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Serialize)]
pub struct TokenResponse {
    token: String,
    message: String,
}

fn validate_signup(req: &SignupRequest) -> Result<(String, String), ApiError> {
    let mut errors = Vec::new();

    match &req.username {
        None => errors.push(FieldError::new("username", "Required")),
        Some(username) => {
            let chars = username.chars().count();
            if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&chars) {
                errors.push(FieldError::new(
                    "username",
                    format!("must be {USERNAME_MIN_CHARS}-{USERNAME_MAX_CHARS} characters"),
                ));
            }
        }
    }

    match &req.password {
        None => errors.push(FieldError::new("password", "Required")),
        Some(password) => {
            if password.chars().count() < PASSWORD_MIN_CHARS {
                errors.push(FieldError::new(
                    "password",
                    format!("must be at least {PASSWORD_MIN_CHARS} characters"),
                ));
            }
        }
    }

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    // Both present and well-formed past this point
    Ok((
        req.username.clone().unwrap_or_default(),
        req.password.clone().unwrap_or_default(),
    ))
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let (username, password) = validate_signup(&req)?;

    let password_hash = hash_password(&password)?;
    let user = User::new(username, password_hash);

    if !state.store.create_user(&user)? {
        return Err(ApiError::Conflict("User already exists".into()));
    }

    info!(username = %user.username, "User signed up");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User signed up")),
    ))
}

pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let mut errors = Vec::new();
    if req.username.is_none() {
        errors.push(FieldError::new("username", "Required"));
    }
    if req.password.is_none() {
        errors.push(FieldError::new("password", "Required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let username = req.username.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    let user = state
        .store
        .find_user_by_name(&username)?
        .ok_or_else(|| ApiError::Unauthorized("Incorrect credentials".into()))?;

    if !verify_password(&password, &user.password_hash)? {
        return Err(ApiError::Unauthorized("Incorrect credentials".into()));
    }

    let token = state.tokens.issue(user.id)?;
    info!(username = %user.username, "User signed in");
    Ok(Json(TokenResponse {
        token,
        message: "Signed in successfully".into(),
    }))
}
