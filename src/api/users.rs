//! User registration, login and management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::{Credentials, UserResponse},
    AppState,
};

use super::{ApiJson, InsertedResponse, MessageResponse};

/// Successful login
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    /// ID of the authenticated user
    pub user_id: String,
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/register",
    tag = "users",
    request_body = Credentials,
    responses(
        (status = 201, description = "User created", body = InsertedResponse),
        (status = 400, description = "Invalid JSON or username taken", body = crate::error::ErrorResponse),
        (status = 500, description = "Hashing or database failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Credentials>,
) -> AppResult<(StatusCode, Json<InsertedResponse>)> {
    let id = state
        .services
        .users
        .register(&body.username, &body.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(InsertedResponse {
            inserted_id: id.to_hex(),
        }),
    ))
}

/// Check a username/password pair
#[utoipa::path(
    post,
    path = "/login",
    tag = "users",
    request_body = Credentials,
    responses(
        (status = 200, description = "Credentials valid", body = LoginResponse),
        (status = 400, description = "Invalid JSON", body = crate::error::ErrorResponse),
        (status = 401, description = "Wrong password", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown username", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Credentials>,
) -> AppResult<Json<LoginResponse>> {
    let id = state
        .services
        .users
        .authenticate(&body.username, &body.password)
        .await?;

    Ok(Json(LoginResponse {
        message: "Giriş başarılı".to_string(),
        user_id: id.to_hex(),
    }))
}

/// Get user details by ID
#[utoipa::path(
    get,
    path = "/user/{id}",
    tag = "users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 400, description = "Malformed ID", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.users.get_by_id(&id).await?;
    Ok(Json(user.into()))
}

/// Delete a user, releasing the books it holds
#[utoipa::path(
    delete,
    path = "/user/{id}",
    tag = "users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Malformed ID", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.services.users.delete_user(&id).await?;
    Ok(Json(MessageResponse::new("Kullanıcı silindi")))
}
