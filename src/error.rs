//! Error types for the library server

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Main application error type
///
/// Every variant carries the short message that ends up in the response
/// body; store errors only reach the client through [`AppError::context`].
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Duplicate data. Reported with the same status as a bad request.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Request deadline exceeded")]
    Timeout,

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    /// Replace a raw store error with a user facing message.
    ///
    /// The underlying error is logged here. Business errors pass through.
    pub fn context(self, msg: &str) -> Self {
        match self {
            AppError::Database(e) => {
                tracing::error!("{}: {:?}", msg, e);
                AppError::Internal(msg.to_string())
            }
            other => other,
        }
    }

    /// Whether the error was raised by the store rather than by a rule check
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            AppError::Database(_) | AppError::Timeout | AppError::Internal(_)
        )
    }

    /// Duplicate key rejection from a unique index (E11000)
    pub fn is_duplicate_key(&self) -> bool {
        use mongodb::error::{ErrorKind, WriteFailure};

        match self {
            AppError::Database(e) => matches!(
                e.kind.as_ref(),
                ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == 11000
            ),
            _ => false,
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) | AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Veritabanı hatası".to_string(),
                )
            }
            AppError::Timeout => {
                tracing::warn!("Request deadline exceeded");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "İstek zaman aşımına uğradı".to_string(),
                )
            }
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AppError::BadRequest("Geçersiz JSON".to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

/// E11000 as the driver reports it for a unique index violation
#[cfg(test)]
pub(crate) fn duplicate_key_error() -> AppError {
    use mongodb::{
        bson::{doc, from_document},
        error::{ErrorKind, WriteError, WriteFailure},
    };

    let write_error: WriteError = from_document(doc! {
        "code": 11000,
        "errmsg": "E11000 duplicate key error collection: library.users index: username_1",
    })
    .unwrap();
    AppError::from(mongodb::error::Error::from(ErrorKind::Write(
        WriteFailure::WriteError(write_error),
    )))
}
