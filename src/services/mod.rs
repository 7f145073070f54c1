//! Business logic services

pub mod books;
pub mod loans;
pub mod password;
pub mod users;

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::{
    config::{DatabaseConfig, LendingConfig},
    error::{AppError, AppResult},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub books: books::BooksService,
    pub loans: loans::LoansService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, database: &DatabaseConfig, lending: &LendingConfig) -> Self {
        let timeout = database.request_timeout();

        Self {
            users: users::UsersService::new(repository.clone(), timeout),
            books: books::BooksService::new(repository.clone(), timeout),
            loans: loans::LoansService::new(repository.clone(), timeout, lending.max_books),
            repository,
        }
    }

    /// Check that the store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}

/// Instant after which store operations of one request fail with
/// [`AppError::Timeout`]
#[derive(Debug, Clone, Copy)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }

    pub async fn run<T, F>(&self, operation: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        tokio::time::timeout_at(self.0, operation)
            .await
            .map_err(|_| AppError::Timeout)?
    }
}
