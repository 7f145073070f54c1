//! Book catalog service

use std::time::Duration;

use mongodb::bson::oid::ObjectId;

use crate::{
    error::AppResult,
    models::Book,
    repository::Repository,
    services::Deadline,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    timeout: Duration,
}

impl BooksService {
    pub fn new(repository: Repository, timeout: Duration) -> Self {
        Self { repository, timeout }
    }

    /// Add an available book. Titles are not checked for duplicates.
    pub async fn create_book(&self, title: &str) -> AppResult<ObjectId> {
        let book = Book::new(title);

        Deadline::after(self.timeout)
            .run(self.repository.books.insert(&book))
            .await
            .map_err(|e| e.context("Kitap eklenemedi"))?;

        Ok(book.id)
    }

    /// Every book, in store order
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        Deadline::after(self.timeout)
            .run(self.repository.books.find_all())
            .await
            .map_err(|e| e.context("Kitaplar alınamadı"))
    }
}
