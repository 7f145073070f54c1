//! User registration, login and management service

use std::time::Duration;

use mongodb::bson::oid::ObjectId;

use crate::{
    error::{AppError, AppResult},
    models::{parse_object_id, User},
    repository::Repository,
    services::{password, Deadline},
};

const DUPLICATE_USERNAME: &str = "Kullanıcı adı zaten mevcut";
const USER_NOT_FOUND: &str = "Kullanıcı bulunamadı";
const INVALID_USER_ID: &str = "Geçersiz kullanıcı ID";

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    timeout: Duration,
}

impl UsersService {
    pub fn new(repository: Repository, timeout: Duration) -> Self {
        Self { repository, timeout }
    }

    /// Register a new user, returning its ID
    pub async fn register(&self, username: &str, password: &str) -> AppResult<ObjectId> {
        let deadline = Deadline::after(self.timeout);

        let count = deadline
            .run(self.repository.users.count_by_username(username))
            .await
            .map_err(|e| e.context("Veritabanı hatası"))?;
        if count > 0 {
            return Err(AppError::Conflict(DUPLICATE_USERNAME.to_string()));
        }

        let hash = password::hash_password_blocking(password.to_string()).await?;
        let user = User::new(username, hash);

        // The unique index catches registrations racing past the count check
        match deadline.run(self.repository.users.insert(&user)).await {
            Ok(()) => {}
            Err(e) if e.is_duplicate_key() => {
                return Err(AppError::Conflict(DUPLICATE_USERNAME.to_string()));
            }
            Err(e) => return Err(e.context("Kullanıcı eklenemedi")),
        }

        tracing::info!(user_id = %user.id, username, "User registered");
        Ok(user.id)
    }

    /// Check credentials, returning the user's ID
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<ObjectId> {
        let deadline = Deadline::after(self.timeout);

        let user = deadline
            .run(self.repository.users.find_by_username(username))
            .await
            .map_err(|e| e.context("Veritabanı hatası"))?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;

        if !password::verify_password_blocking(password.to_string(), user.password).await {
            return Err(AppError::Unauthorized("Hatalı şifre".to_string()));
        }

        Ok(user.id)
    }

    /// Get user by ID. The password hash is cleared.
    pub async fn get_by_id(&self, id: &str) -> AppResult<User> {
        let id = parse_object_id(id, INVALID_USER_ID)?;
        let deadline = Deadline::after(self.timeout);

        let mut user = deadline
            .run(self.repository.users.find_by_id(id))
            .await
            .map_err(|e| e.context("Veritabanı hatası"))?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;

        user.password.clear();
        Ok(user)
    }

    /// Delete a user and release every book it still holds.
    ///
    /// The release also runs when no user matched, so repeating the call
    /// frees books left behind by an earlier delete whose release failed.
    pub async fn delete_user(&self, id: &str) -> AppResult<()> {
        let id = parse_object_id(id, INVALID_USER_ID)?;
        let deadline = Deadline::after(self.timeout);

        let deleted = deadline
            .run(self.repository.users.delete_by_id(id))
            .await
            .map_err(|e| e.context("Kullanıcı silinemedi"))?;

        let released = deadline
            .run(self.repository.books.release_all_held_by(id))
            .await
            .map_err(|e| e.context("Kullanıcı silindi fakat kitaplar serbest bırakılamadı"))?;

        if deleted == 0 {
            if released > 0 {
                tracing::warn!(user_id = %id, released, "Released books of an already deleted user");
            }
            return Err(AppError::not_found(USER_NOT_FOUND));
        }

        tracing::info!(user_id = %id, released, "User deleted");
        Ok(())
    }
}
