//! Repository layer for database operations
//!
//! Services only see the [`UserStore`] and [`BookStore`] traits. The MongoDB
//! implementations live in [`users`] and [`books`], the in-memory one in
//! [`memory`].

pub mod books;
pub mod memory;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::ClientOptions,
    Client, Database,
};

use crate::{
    config::DatabaseConfig,
    error::{AppError, AppResult},
    models::{Book, User},
};

pub const USERS_COLLECTION: &str = "users";
pub const BOOKS_COLLECTION: &str = "books";

/// Access to the `users` collection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn count_by_username(&self, username: &str) -> AppResult<u64>;

    /// Insert a new user. A username rejected by the unique index surfaces
    /// as a duplicate key error (see [`AppError::is_duplicate_key`]).
    async fn insert(&self, user: &User) -> AppResult<()>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    async fn find_by_id(&self, id: ObjectId) -> AppResult<Option<User>>;

    /// Returns the number of deleted documents
    async fn delete_by_id(&self, id: ObjectId) -> AppResult<u64>;

    /// Append `book_id` to the user's list while it holds fewer than
    /// `limit` books. Returns false when no document matched.
    async fn push_book(&self, user_id: ObjectId, book_id: ObjectId, limit: usize) -> AppResult<bool>;

    async fn pull_book(&self, user_id: ObjectId, book_id: ObjectId) -> AppResult<()>;
}

/// Access to the `books` collection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn insert(&self, book: &Book) -> AppResult<()>;

    async fn find_all(&self) -> AppResult<Vec<Book>>;

    async fn find_by_id(&self, id: ObjectId) -> AppResult<Option<Book>>;

    /// Set the borrower, only while the book is available.
    /// Returns false when the book was taken (or vanished) in the meantime.
    async fn claim(&self, book_id: ObjectId, user_id: ObjectId) -> AppResult<bool>;

    /// Clear the borrower, only while it is `user_id`.
    /// Returns false when the book was not held by that user.
    async fn release(&self, book_id: ObjectId, user_id: ObjectId) -> AppResult<bool>;

    /// Clear the borrower of every book held by `user_id`
    async fn release_all_held_by(&self, user_id: ObjectId) -> AppResult<u64>;
}

/// Main repository struct holding the store handles
#[derive(Clone)]
pub struct Repository {
    pub users: Arc<dyn UserStore>,
    pub books: Arc<dyn BookStore>,
    database: Option<Database>,
}

impl Repository {
    /// Create a repository over a connected MongoDB database
    pub async fn mongodb(database: Database) -> AppResult<Self> {
        let users = users::UsersRepository::new(&database);
        users.ensure_indexes().await?;

        Ok(Self {
            users: Arc::new(users),
            books: Arc::new(books::BooksRepository::new(&database)),
            database: Some(database),
        })
    }

    /// Create a repository backed by process memory
    pub fn memory() -> Self {
        Self::from_stores(
            Arc::new(memory::MemoryUserStore::default()),
            Arc::new(memory::MemoryBookStore::default()),
        )
    }

    pub fn from_stores(users: Arc<dyn UserStore>, books: Arc<dyn BookStore>) -> Self {
        Self {
            users,
            books,
            database: None,
        }
    }

    /// Round trip to the database server. Always succeeds without one.
    pub async fn ping(&self) -> AppResult<()> {
        if let Some(database) = &self.database {
            database.run_command(doc! { "ping": 1 }).await?;
        }
        Ok(())
    }
}

/// Connect to MongoDB and verify the server answers within the connect timeout
pub async fn connect(config: &DatabaseConfig) -> AppResult<Database> {
    let mut options = ClientOptions::parse(&config.uri).await?;
    options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(config.connect_timeout());
    options.server_selection_timeout = Some(config.connect_timeout());

    let client = Client::with_options(options)?;
    let database = client.database(&config.name);

    tokio::time::timeout(config.connect_timeout(), async {
        database.run_command(doc! { "ping": 1 }).await
    })
    .await
    .map_err(|_| AppError::Timeout)??;

    Ok(database)
}
