//! Borrow and return endpoints

use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{error::AppResult, AppState};

use super::{ApiJson, MessageResponse};

/// Borrow or return request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoanRequest {
    /// User ID
    pub user_id: String,
    /// Book ID
    pub book_id: String,
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/borrow",
    tag = "loans",
    request_body = LoanRequest,
    responses(
        (status = 200, description = "Book borrowed", body = MessageResponse),
        (status = 400, description = "Invalid input, limit reached or book already borrowed", body = crate::error::ErrorResponse),
        (status = 404, description = "User or book not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Database failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrow_book(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoanRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .services
        .loans
        .borrow(&request.user_id, &request.book_id)
        .await?;

    Ok(Json(MessageResponse::new("Kitap başarıyla ödünç alındı")))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/return",
    tag = "loans",
    request_body = LoanRequest,
    responses(
        (status = 200, description = "Book returned", body = MessageResponse),
        (status = 400, description = "Invalid input or book not held by the user", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Database failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoanRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .services
        .loans
        .return_book(&request.user_id, &request.book_id)
        .await?;

    Ok(Json(MessageResponse::new("Kitap başarıyla iade edildi")))
}
