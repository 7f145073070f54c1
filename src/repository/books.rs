//! Books repository for database operations

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson},
    Collection, Database,
};

use super::{BookStore, BOOKS_COLLECTION};
use crate::{
    error::{AppError, AppResult},
    models::Book,
};

#[derive(Clone)]
pub struct BooksRepository {
    collection: Collection<Book>,
}

impl BooksRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(BOOKS_COLLECTION),
        }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn insert(&self, book: &Book) -> AppResult<()> {
        self.collection.insert_one(book).await?;
        Ok(())
    }

    async fn find_all(&self) -> AppResult<Vec<Book>> {
        let cursor = self
            .collection
            .find(doc! {})
            .await
            .map_err(|e| AppError::from(e).context("Kitaplar alınamadı"))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| AppError::from(e).context("Kitaplar parse edilemedi"))
    }

    async fn find_by_id(&self, id: ObjectId) -> AppResult<Option<Book>> {
        let book = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(book)
    }

    async fn claim(&self, book_id: ObjectId, user_id: ObjectId) -> AppResult<bool> {
        // `null` also matches a missing field
        let result = self
            .collection
            .update_one(
                doc! { "_id": book_id, "borrower_id": Bson::Null },
                doc! { "$set": { "borrower_id": user_id } },
            )
            .await?;

        Ok(result.matched_count == 1)
    }

    async fn release(&self, book_id: ObjectId, user_id: ObjectId) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": book_id, "borrower_id": user_id },
                doc! { "$unset": { "borrower_id": "" } },
            )
            .await?;

        Ok(result.matched_count == 1)
    }

    async fn release_all_held_by(&self, user_id: ObjectId) -> AppResult<u64> {
        let result = self
            .collection
            .update_many(
                doc! { "borrower_id": user_id },
                doc! { "$unset": { "borrower_id": "" } },
            )
            .await?;

        Ok(result.modified_count)
    }
}
