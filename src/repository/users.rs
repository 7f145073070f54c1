//! Users repository for database operations

use async_trait::async_trait;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::IndexOptions,
    Collection, Database, IndexModel,
};

use super::{UserStore, USERS_COLLECTION};
use crate::{
    error::{AppError, AppResult},
    models::User,
};

#[derive(Clone)]
pub struct UsersRepository {
    collection: Collection<User>,
}

impl UsersRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(USERS_COLLECTION),
        }
    }

    /// Create the unique index on `username`
    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection
            .create_index(index)
            .await
            .map_err(|e| index_error(AppError::from(e)))?;
        Ok(())
    }
}

/// Index creation fails with E11000 when stored users already share a
/// username. The server cannot start until those are merged or removed.
fn index_error(err: AppError) -> AppError {
    if err.is_duplicate_key() {
        tracing::error!(
            collection = USERS_COLLECTION,
            "Cannot create unique index on username: existing users share a username, \
             remove the duplicates and restart: {}",
            err
        );
        return AppError::Internal(DUPLICATE_USERNAMES_STORED.to_string());
    }
    err
}

const DUPLICATE_USERNAMES_STORED: &str = "Veritabanında aynı kullanıcı adına sahip kayıtlar var";

/// Filter matching a user holding fewer than `limit` books
fn below_limit_filter(user_id: ObjectId, limit: usize) -> Document {
    // books.<limit - 1> exists iff the list already has `limit` entries
    let mut filter = doc! { "_id": user_id };
    filter.insert(format!("books.{}", limit - 1), doc! { "$exists": false });
    filter
}

#[async_trait]
impl UserStore for UsersRepository {
    async fn count_by_username(&self, username: &str) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! { "username": username })
            .await?;
        Ok(count)
    }

    async fn insert(&self, user: &User) -> AppResult<()> {
        self.collection.insert_one(user).await?;
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "username": username })
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: ObjectId) -> AppResult<Option<User>> {
        let user = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(user)
    }

    async fn delete_by_id(&self, id: ObjectId) -> AppResult<u64> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count)
    }

    async fn push_book(&self, user_id: ObjectId, book_id: ObjectId, limit: usize) -> AppResult<bool> {
        if limit == 0 {
            return Ok(false);
        }

        let result = self
            .collection
            .update_one(
                below_limit_filter(user_id, limit),
                doc! { "$push": { "books": book_id } },
            )
            .await?;

        Ok(result.matched_count == 1)
    }

    async fn pull_book(&self, user_id: ObjectId, book_id: ObjectId) -> AppResult<()> {
        self.collection
            .update_one(
                doc! { "_id": user_id },
                doc! { "$pull": { "books": book_id } },
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_error_explains_stored_duplicates() {
        let err = index_error(crate::error::duplicate_key_error());
        assert!(matches!(err, AppError::Internal(ref m) if m == DUPLICATE_USERNAMES_STORED));

        let err = index_error(AppError::Timeout);
        assert!(matches!(err, AppError::Timeout));
    }

    #[test]
    fn test_below_limit_filter() {
        let id = ObjectId::new();
        let filter = below_limit_filter(id, 2);
        assert_eq!(filter.get_object_id("_id").unwrap(), id);
        assert_eq!(
            filter.get_document("books.1").unwrap(),
            &doc! { "$exists": false }
        );
    }
}
