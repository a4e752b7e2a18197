use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;
use voxtutor::{errors::StorageError, AiError};
use voxtutor_access::AccessError;

/// A custom error type for the server application.
///
/// Every variant renders as a JSON body of the shape
/// `{"success": false, "error": "...", "code": "..."}` where `code` is
/// only present for validation failures that clients branch on.
pub enum AppError {
    /// Client-side validation failures (400).
    Validation {
        message: String,
        code: Option<&'static str>,
    },
    /// Missing or invalid credentials (401).
    Unauthorized(String),
    /// The requested resource does not exist or isn't owned by the caller (404).
    NotFound(String),
    /// The upstream AI provider failed (500, with a stable code).
    Ai(AiError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            code: None,
        }
    }

    pub fn validation_with_code(message: impl Into<String>, code: &'static str) -> Self {
        AppError::Validation {
            message: message.into(),
            code: Some(code),
        }
    }
}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        AppError::Ai(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Internal(err.into())
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::EmailTaken => AppError::validation_with_code(
                "User with this email already exists",
                "DUPLICATE_EMAIL",
            ),
            other => AppError::Internal(other.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message, code) = match self {
            AppError::Validation { message, code } => (StatusCode::BAD_REQUEST, message, code),
            AppError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message, None),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message, None),
            AppError::Ai(err) => {
                error!("AI provider error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to process your question. Please try again.".to_string(),
                    Some("CHAT_PROCESSING_ERROR"),
                )
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({
            "success": false,
            "error": error_message,
        });
        if let Some(code) = code {
            body["code"] = json!(code);
        }

        (status_code, Json(body)).into_response()
    }
}
