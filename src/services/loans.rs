//! Loan management service
//!
//! A loan touches two documents: the book's `borrower_id` and the user's
//! `books` list. They are written one after the other, book first, without a
//! transaction:
//!
//! - borrow: claim the book, then push it onto the user. If the push fails
//!   the claim is undone (see [`LoansService::compensate`]). A crash between
//!   the two writes leaves the book unavailable but missing from the user's
//!   list, so it can never be lent twice.
//! - return: release the book, then pull it from the user. A failed pull is
//!   not undone; the user keeps listing a book that is available again.
//!
//! Both book writes are conditional single-document updates, so two
//! concurrent borrows of the same book cannot both succeed.

use std::time::Duration;

use mongodb::bson::oid::ObjectId;

use crate::{
    error::{AppError, AppResult},
    models::{parse_object_id, Book, User},
    repository::Repository,
    services::Deadline,
};

const USER_NOT_FOUND: &str = "Kullanıcı bulunamadı";
const BOOK_NOT_FOUND: &str = "Kitap bulunamadı";
const ALREADY_BORROWED: &str = "Kitap zaten ödünç alınmış";
const NOT_OWNER: &str = "Bu kitap bu kullanıcıya ait değil";

/// Attempts made to undo a claim after the user update failed
const COMPENSATION_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    timeout: Duration,
    max_books: usize,
}

impl LoansService {
    pub fn new(repository: Repository, timeout: Duration, max_books: usize) -> Self {
        Self {
            repository,
            timeout,
            max_books,
        }
    }

    /// Lend a book to a user
    pub async fn borrow(&self, user_id: &str, book_id: &str) -> AppResult<()> {
        let user_id = parse_object_id(user_id, "Geçersiz user_id")?;
        let book_id = parse_object_id(book_id, "Geçersiz book_id")?;
        let deadline = Deadline::after(self.timeout);

        let user = self.load_user(&deadline, user_id).await?;
        if user.books.len() >= self.max_books {
            return Err(self.limit_reached());
        }

        let book = self.load_book(&deadline, book_id).await?;
        if !book.is_available() {
            return Err(AppError::bad_request(ALREADY_BORROWED));
        }

        let claimed = deadline
            .run(self.repository.books.claim(book_id, user_id))
            .await
            .map_err(|e| e.context("Kitap güncellenemedi"))?;
        if !claimed {
            // Lost the race against another borrower
            return Err(AppError::bad_request(ALREADY_BORROWED));
        }

        match deadline
            .run(self.repository.users.push_book(user_id, book_id, self.max_books))
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                self.compensate(book_id, user_id).await;
                return Err(self.explain_rejected_push(user_id).await);
            }
            Err(e) => {
                self.compensate(book_id, user_id).await;
                return Err(e.context("Kullanıcı güncellenemedi"));
            }
        }

        tracing::info!(%user_id, %book_id, "Book borrowed");
        Ok(())
    }

    /// Take a book back from the user holding it
    pub async fn return_book(&self, user_id: &str, book_id: &str) -> AppResult<()> {
        let user_id = parse_object_id(user_id, "Geçersiz user_id")?;
        let book_id = parse_object_id(book_id, "Geçersiz book_id")?;
        let deadline = Deadline::after(self.timeout);

        let book = self.load_book(&deadline, book_id).await?;
        if !book.is_held_by(&user_id) {
            return Err(AppError::bad_request(NOT_OWNER));
        }

        let released = deadline
            .run(self.repository.books.release(book_id, user_id))
            .await
            .map_err(|e| e.context("Kitap güncellenemedi"))?;
        if !released {
            return Err(AppError::bad_request(NOT_OWNER));
        }

        if let Err(e) = deadline
            .run(self.repository.users.pull_book(user_id, book_id))
            .await
        {
            tracing::error!(%user_id, %book_id, "Book released but still listed on the user");
            return Err(e.context("Kullanıcı güncellenemedi"));
        }

        tracing::info!(%user_id, %book_id, "Book returned");
        Ok(())
    }

    async fn load_user(&self, deadline: &Deadline, id: ObjectId) -> AppResult<User> {
        deadline
            .run(self.repository.users.find_by_id(id))
            .await
            .map_err(|e| e.context("Veritabanı hatası"))?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))
    }

    async fn load_book(&self, deadline: &Deadline, id: ObjectId) -> AppResult<Book> {
        deadline
            .run(self.repository.books.find_by_id(id))
            .await
            .map_err(|e| e.context("Veritabanı hatası"))?
            .ok_or_else(|| AppError::not_found(BOOK_NOT_FOUND))
    }

    fn limit_reached(&self) -> AppError {
        AppError::bad_request(format!("Kullanıcının {} kitap limiti doldu", self.max_books))
    }

    /// The conditional push matched nothing: the user is gone or reached the
    /// limit through a concurrent borrow.
    async fn explain_rejected_push(&self, user_id: ObjectId) -> AppError {
        let lookup = Deadline::after(self.timeout)
            .run(self.repository.users.find_by_id(user_id))
            .await;

        match lookup {
            Ok(Some(_)) => self.limit_reached(),
            Ok(None) => AppError::not_found(USER_NOT_FOUND),
            Err(e) => e.context("Kullanıcı güncellenemedi"),
        }
    }

    /// Undo a claim. Runs under its own deadline so an expired request
    /// deadline does not prevent it. Idempotent: the release only matches
    /// while `user_id` still holds the book. Failure is logged, never
    /// returned.
    async fn compensate(&self, book_id: ObjectId, user_id: ObjectId) {
        for attempt in 1..=COMPENSATION_ATTEMPTS {
            let result = Deadline::after(self.timeout)
                .run(self.repository.books.release(book_id, user_id))
                .await;

            match result {
                Ok(_) => {
                    tracing::warn!(%user_id, %book_id, attempt, "Borrow rolled back");
                    return;
                }
                Err(e) => {
                    tracing::warn!(%user_id, %book_id, attempt, "Borrow rollback failed: {}", e);
                }
            }
        }

        tracing::error!(
            %user_id,
            %book_id,
            "Book left marked as borrowed, manual repair needed"
        );
    }
}
