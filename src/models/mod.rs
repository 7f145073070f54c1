//! Data models for the library server

pub mod book;
pub mod user;

use mongodb::bson::oid::ObjectId;

use crate::error::AppError;

// Re-export commonly used types
pub use book::{Book, BookResponse};
pub use user::{User, UserResponse};

/// Parse a 24 character hex identifier, failing with the given message
pub fn parse_object_id(raw: &str, invalid_message: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw).map_err(|_| AppError::bad_request(invalid_message))
}
