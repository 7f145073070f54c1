//! Book catalog endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::book::{BookResponse, CreateBook},
    AppState,
};

use super::{ApiJson, InsertedResponse};

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/book",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = InsertedResponse),
        (status = 400, description = "Invalid JSON", body = crate::error::ErrorResponse),
        (status = 500, description = "Database failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateBook>,
) -> AppResult<(StatusCode, Json<InsertedResponse>)> {
    let id = state.services.books.create_book(&body.title).await?;

    Ok((
        StatusCode::CREATED,
        Json(InsertedResponse {
            inserted_id: id.to_hex(),
        }),
    ))
}

/// List every book
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All books", body = Vec<BookResponse>),
        (status = 500, description = "Database failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<BookResponse>>> {
    let books = state.services.books.list_books().await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}
