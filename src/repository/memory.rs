//! In-memory stores
//!
//! Same conditional-update semantics as the MongoDB repositories, held in
//! process memory. Used by the `memory` backend and by the tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use super::{BookStore, UserStore};
use crate::{
    error::{AppError, AppResult},
    models::{Book, User},
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn count_by_username(&self, username: &str) -> AppResult<u64> {
        let users = lock(&self.users);
        Ok(users.iter().filter(|u| u.username == username).count() as u64)
    }

    async fn insert(&self, user: &User) -> AppResult<()> {
        let mut users = lock(&self.users);
        if users.iter().any(|u| u.username == user.username) {
            return Err(AppError::Conflict("Kullanıcı adı zaten mevcut".to_string()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let users = lock(&self.users);
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: ObjectId) -> AppResult<Option<User>> {
        let users = lock(&self.users);
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn delete_by_id(&self, id: ObjectId) -> AppResult<u64> {
        let mut users = lock(&self.users);
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok((before - users.len()) as u64)
    }

    async fn push_book(&self, user_id: ObjectId, book_id: ObjectId, limit: usize) -> AppResult<bool> {
        let mut users = lock(&self.users);
        match users.iter_mut().find(|u| u.id == user_id) {
            Some(user) if user.books.len() < limit => {
                user.books.push(book_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn pull_book(&self, user_id: ObjectId, book_id: ObjectId) -> AppResult<()> {
        let mut users = lock(&self.users);
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.books.retain(|b| *b != book_id);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryBookStore {
    books: Mutex<Vec<Book>>,
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn insert(&self, book: &Book) -> AppResult<()> {
        lock(&self.books).push(book.clone());
        Ok(())
    }

    async fn find_all(&self) -> AppResult<Vec<Book>> {
        Ok(lock(&self.books).clone())
    }

    async fn find_by_id(&self, id: ObjectId) -> AppResult<Option<Book>> {
        let books = lock(&self.books);
        Ok(books.iter().find(|b| b.id == id).cloned())
    }

    async fn claim(&self, book_id: ObjectId, user_id: ObjectId) -> AppResult<bool> {
        let mut books = lock(&self.books);
        match books.iter_mut().find(|b| b.id == book_id) {
            Some(book) if book.is_available() => {
                book.borrower_id = Some(user_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release(&self, book_id: ObjectId, user_id: ObjectId) -> AppResult<bool> {
        let mut books = lock(&self.books);
        match books.iter_mut().find(|b| b.id == book_id) {
            Some(book) if book.is_held_by(&user_id) => {
                book.borrower_id = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_all_held_by(&self, user_id: ObjectId) -> AppResult<u64> {
        let mut books = lock(&self.books);
        let mut released = 0;
        for book in books.iter_mut().filter(|b| b.is_held_by(&user_id)) {
            book.borrower_id = None;
            released += 1;
        }
        Ok(released)
    }
}
