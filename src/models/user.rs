//! User model and related types

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User document as stored in the `users` collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    /// Argon2 PHC string
    pub password: String,
    /// Identifiers of the books currently held, in borrow order
    #[serde(default)]
    pub books: Vec<ObjectId>,
}

impl User {
    /// New user holding no books
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            username: username.into(),
            password: password_hash.into(),
            books: Vec::new(),
        }
    }

    pub fn holds(&self, book_id: &ObjectId) -> bool {
        self.books.contains(book_id)
    }
}

/// User as returned by the API (never carries the password)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// User ID (24 hex characters)
    pub id: String,
    pub username: String,
    /// IDs of the borrowed books
    pub books: Vec<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            username: user.username,
            books: user.books.into_iter().map(|id| id.to_hex()).collect(),
        }
    }
}

/// Register and login request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}
