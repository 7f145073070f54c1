//! API handlers for the library REST endpoints

pub mod books;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod users;

use axum::extract::FromRequest;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;

/// JSON body extractor answering malformed bodies with `{"error": "Geçersiz JSON"}`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Response for endpoints creating a document
#[derive(Debug, Serialize, ToSchema)]
pub struct InsertedResponse {
    /// ID of the new document (24 hex characters)
    pub inserted_id: String,
}

/// Plain confirmation message
#[derive(Debug, Serialize, ToSchema)]
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
