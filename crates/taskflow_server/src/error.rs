//! HTTP error taxonomy and the uniform failure envelope.
//!
//! # Invariants
//! - Every failure body is `{ "success": false, "message": ... }`.
//! - Internal details are logged, never returned to the client.
//! - Rejected requests get a fixed message; parser wording stays in the log.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{debug, error};
use taskflow_core::{AuthError, MessageEnvelope, RepoError, TaskServiceError};
use thiserror::Error;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";
pub const MALFORMED_JSON_MESSAGE: &str = "Malformed JSON body";
pub const JSON_CONTENT_TYPE_MESSAGE: &str = "Expected a JSON body (Content-Type: application/json)";
pub const INVALID_QUERY_MESSAGE: &str = "Invalid query parameters";
pub const INVALID_PATH_MESSAGE: &str = "Invalid path parameter";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    /// Detail is logged; clients only see [`INTERNAL_ERROR_MESSAGE`].
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn task_not_found() -> Self {
        Self::NotFound("Task not found".to_string())
    }

    /// 400 with a fixed client message. Only `kind` is logged, since parser
    /// output can quote request values.
    pub fn rejected(message: &'static str, kind: &str) -> Self {
        debug!("event=http_reject module=api status=error kind={kind}");
        Self::Validation(message.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Internal(detail) => {
                error!(
                    "event=http_error module=api status=error http_status={} detail={detail}",
                    status.as_u16()
                );
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            Self::Validation(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message) => message,
        };

        (status, Json(MessageEnvelope::failure(message))).into_response()
    }
}

impl From<TaskServiceError> for ApiError {
    fn from(value: TaskServiceError) -> Self {
        match value {
            TaskServiceError::Validation(message) => Self::Validation(message),
            TaskServiceError::NotFound(_) => Self::task_not_found(),
            TaskServiceError::Forbidden(err) => Self::Forbidden(err.to_string()),
            other @ (TaskServiceError::Repo(_) | TaskServiceError::InconsistentState(_)) => {
                Self::Internal(other.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::Validation(message) => Self::Validation(message),
            err @ AuthError::EmailTaken => Self::Validation(err.to_string()),
            err @ (AuthError::InvalidCredentials | AuthError::Unauthorized) => {
                Self::Unauthorized(err.to_string())
            }
            other @ (AuthError::PasswordHash(_)
            | AuthError::SessionLifetime(_)
            | AuthError::Repo(_)) => {
                Self::Internal(other.to_string())
            }
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        match value {
            JsonRejection::JsonDataError(_) => Self::rejected(INVALID_BODY_MESSAGE, "json_data"),
            JsonRejection::JsonSyntaxError(_) => {
                Self::rejected(MALFORMED_JSON_MESSAGE, "json_syntax")
            }
            JsonRejection::MissingJsonContentType(_) => {
                Self::rejected(JSON_CONTENT_TYPE_MESSAGE, "json_content_type")
            }
            _ => Self::rejected(INVALID_BODY_MESSAGE, "body"),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(_: QueryRejection) -> Self {
        Self::rejected(INVALID_QUERY_MESSAGE, "query")
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        Self::rejected(INVALID_PATH_MESSAGE, "path")
    }
}
