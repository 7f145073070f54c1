//! Book model and related types

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Book document as stored in the `books` collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    /// Present while the book is checked out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrower_id: Option<ObjectId>,
}

impl Book {
    /// New, available book
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            title: title.into(),
            borrower_id: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.borrower_id.is_none()
    }

    pub fn is_held_by(&self, user_id: &ObjectId) -> bool {
        self.borrower_id.as_ref() == Some(user_id)
    }
}

/// Book as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    /// Book ID (24 hex characters)
    pub id: String,
    pub title: String,
    /// ID of the user holding the book, absent when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borrower_id: Option<String>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.to_hex(),
            title: book.title,
            borrower_id: book.borrower_id.map(|id| id.to_hex()),
        }
    }
}

/// Add book request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBook {
    pub title: String,
}
