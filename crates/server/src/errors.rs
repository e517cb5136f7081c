use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use common::types::ErrorBody;
use models::errors::ModelError;
use service::auth::errors::AuthError;
use service::errors::ServiceError;

/// Error response shared by every handler: `{ "error": title, "message": detail }`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: String,
    pub message: Option<String>,
}

pub type ApiResult<T> = Result<T, JsonApiError>;

impl JsonApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, message: Option<String>) -> Self {
        Self { status, error: error.into(), message }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request", Some(message.into()))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden", Some(message.into()))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found", Some(message.into()))
    }

    /// 500 with a generic body; the detail only goes to the log.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        error!(error = %detail, "internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some("an unexpected error occurred".into()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.error, message: self.message };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) | ServiceError::Conflict(msg) => Self::bad_request(msg),
            ServiceError::Model(ModelError::Validation(msg) | ModelError::Conflict(msg)) => Self::bad_request(msg),
            ServiceError::NotFound(msg) => Self::not_found(msg),
            ServiceError::Forbidden(msg) => Self::forbidden(msg),
            ServiceError::Auth(inner) => inner.into(),
            other @ (ServiceError::Db(_) | ServiceError::Model(ModelError::Db(_))) => Self::internal(other),
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(msg) => Self::bad_request(msg),
            AuthError::Conflict => Self::bad_request(e.to_string()),
            AuthError::NotFound => Self::not_found(e.to_string()),
            // one message for unknown email, wrong password and wrong role
            AuthError::Unauthorized => Self::unauthorized("invalid email or password"),
            AuthError::Inactive => Self::unauthorized(e.to_string()),
            AuthError::TokenError(_) => Self::unauthorized("invalid or expired token"),
            AuthError::Forbidden(msg) => Self::forbidden(msg),
            AuthError::HashError(_) | AuthError::Repository(_) => {
                error!(code = e.code(), "auth failure");
                Self::internal(e)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
