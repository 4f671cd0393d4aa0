use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum StashError {
    #[error("Failed to parse URL: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Failed to fetch content: {0}")]
    FetchError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Password hashing failed: {0}")]
    PasswordHashError(String),

    #[error("Token error: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),

    #[error("Model not available: {0}")]
    ModelUnavailable(String),

    #[error("External service error: {service} - {message}")]
    ExternalServiceError { service: String, message: String },

    #[error("Assistant not configured: {0}")]
    NotConfigured(String),
}

impl StashError {
    pub fn log(&self) {
        match self {
            StashError::UrlParseError(e) => {
                warn!(error = %e, "URL parsing failed");
            }
            StashError::FetchError(e) => {
                warn!(error = %e, "Content fetch failed");
            }
            StashError::StorageError(e) => {
                error!(error = %e, "Storage operation failed");
            }
            StashError::SerializationError(e) => {
                error!(error = %e, "Document serialization failed");
            }
            StashError::PasswordHashError(e) => {
                error!(error = %e, "Password hashing failed");
            }
            StashError::TokenError(e) => {
                warn!(error = %e, "Token validation failed");
            }
            StashError::ModelUnavailable(model) => {
                error!(model = %model, "Requested model is not available");
            }
            StashError::ExternalServiceError { service, message } => {
                error!(
                    service = %service,
                    error = %message,
                    "External service error occurred"
                );
            }
            StashError::NotConfigured(e) => {
                warn!(error = %e, "Assistant invoked without configuration");
            }
        }
    }
}

/// One field that failed request validation, reported back to the client.
#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    // The public share endpoint answers misses with 411, a long-standing
    // quirk of the wire contract that clients depend on.
    #[error("{0}")]
    ShareNotFound(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("Internal error")]
    Internal(#[source] StashError),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

#[derive(Serialize)]
struct ValidationBody {
    message: String,
    errors: Vec<FieldError>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ShareNotFound(_) => StatusCode::LENGTH_REQUIRED,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match self {
            ApiError::Validation(errors) => (
                status,
                Json(ValidationBody {
                    message: "Invalid input".into(),
                    errors,
                }),
            )
                .into_response(),
            ApiError::Internal(source) => {
                source.log();
                (
                    status,
                    Json(ErrorBody {
                        message: "Internal server error".into(),
                    }),
                )
                    .into_response()
            }
            other => (
                status,
                Json(ErrorBody {
                    message: other.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

impl From<StashError> for ApiError {
    fn from(err: StashError) -> Self {
        match err {
            StashError::ModelUnavailable(model) => {
                ApiError::Unavailable(format!("Model not available: {model}"))
            }
            StashError::NotConfigured(msg) => ApiError::Unavailable(msg),
            StashError::ExternalServiceError { service, message } => {
                ApiError::Upstream(format!("{service}: {message}"))
            }
            other => ApiError::Internal(other),
        }
    }
}
