//! Library lending server
//!
//! A REST JSON API over MongoDB managing users and books, with borrow/return
//! enforcing a per-user lending limit and one borrower per book.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig, repository: repository::Repository) -> Self {
        let services = services::Services::new(repository, &config.database, &config.lending);
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Users
        .route("/register", post(api::users::register))
        .route("/login", post(api::users::login))
        .route("/user/:id", get(api::users::get_user).delete(api::users::delete_user))
        // Books
        .route("/book", post(api::books::create_book))
        .route("/books", get(api::books::list_books))
        // Loans
        .route("/borrow", post(api::loans::borrow_book))
        .route("/return", post(api::loans::return_book))
        .with_state(state);

    Router::new()
        .merge(api)
        .merge(api::openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
