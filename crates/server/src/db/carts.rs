//! Cart repository.

use fitlife_core::{CartItem, CartStatus, DeleteResult, DocumentId, UpdateResult};
use serde_json::Value;

use super::{
    Collection, Document, DocumentStore, Filter, FindOptions, InsertOutcome, StoreError,
    from_document, to_document,
};

/// Repository for cart items.
pub struct CartRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Every cart item of every user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store query fails or a document is malformed.
    pub async fn list_all(&self) -> Result<Vec<CartItem>, StoreError> {
        self.find(&Filter::all()).await
    }

    /// Cart items owned by `email` (exact match).
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store query fails or a document is malformed.
    pub async fn list_by_email(&self, email: &str) -> Result<Vec<CartItem>, StoreError> {
        self.find(&Filter::all().where_eq(CartItem::EMAIL_FIELD, email))
            .await
    }

    /// Add an item unless one already references the same product.
    ///
    /// A missing `product_id` is looked up as `null`, so a second item
    /// without a product reference is also reported as a duplicate.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store fails.
    pub async fn add(&self, item: &CartItem) -> Result<InsertOutcome, StoreError> {
        let product_id = item.product_id.clone().unwrap_or(Value::Null);
        let existing = self
            .store
            .find_one(
                Collection::Carts,
                &Filter::all().where_eq(CartItem::PRODUCT_ID_FIELD, product_id),
            )
            .await?;
        if existing.is_some() {
            return Ok(InsertOutcome::Duplicate);
        }

        match self
            .store
            .insert_one(Collection::Carts, to_document(item)?)
            .await
        {
            Ok(ack) => Ok(InsertOutcome::Inserted(ack)),
            Err(StoreError::Conflict(_)) => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(e),
        }
    }

    /// Set the status of one cart item.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidId` if `id` is not a document identifier,
    /// or `StoreError` if the update fails.
    pub async fn set_status(
        &self,
        id: &str,
        status: CartStatus,
    ) -> Result<UpdateResult, StoreError> {
        let id: DocumentId = id.parse()?;
        let mut set = Document::new();
        set.insert(
            CartItem::STATUS_FIELD.to_owned(),
            Value::String(status.as_str().to_owned()),
        );
        self.store
            .update_one(Collection::Carts, &Filter::by_id(id), set)
            .await
    }

    /// Remove one cart item.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidId` if `id` is not a document identifier,
    /// or `StoreError` if the delete fails.
    pub async fn delete(&self, id: &str) -> Result<DeleteResult, StoreError> {
        let id: DocumentId = id.parse()?;
        self.store
            .delete_one(Collection::Carts, &Filter::by_id(id))
            .await
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<CartItem>, StoreError> {
        self.store
            .find(Collection::Carts, filter, &FindOptions::default())
            .await?
            .into_iter()
            .map(|doc| from_document(Collection::Carts, doc))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::MemoryStore;

    fn item(email: &str, product_id: &str) -> CartItem {
        serde_json::from_value(json!({
            "email": email,
            "product_id": product_id,
            "name": "Foam Roller"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_add_same_product_twice_is_duplicate() {
        let store = MemoryStore::new();
        let repo = CartRepository::new(&store);

        let first = repo.add(&item("a@x.com", "p-1")).await.unwrap();
        assert!(matches!(first, InsertOutcome::Inserted(_)));

        // Uniqueness is per product, not per owner
        let second = repo.add(&item("b@x.com", "p-1")).await.unwrap();
        assert_eq!(second, InsertOutcome::Duplicate);
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_product_id_is_compared_as_json() {
        let store = MemoryStore::new();
        let repo = CartRepository::new(&store);
        let numeric: CartItem =
            serde_json::from_value(json!({ "email": "a@x.com", "product_id": 7 })).unwrap();

        let first = repo.add(&numeric).await.unwrap();
        assert!(matches!(first, InsertOutcome::Inserted(_)));
        assert_eq!(repo.add(&numeric).await.unwrap(), InsertOutcome::Duplicate);

        // The string "7" is a different product reference
        let second = repo.add(&item("a@x.com", "7")).await.unwrap();
        assert!(matches!(second, InsertOutcome::Inserted(_)));
    }

    #[tokio::test]
    async fn test_list_by_email() {
        let store = MemoryStore::new();
        let repo = CartRepository::new(&store);
        repo.add(&item("a@x.com", "p-1")).await.unwrap();
        repo.add(&item("b@x.com", "p-2")).await.unwrap();
        repo.add(&item("a@x.com", "p-3")).await.unwrap();

        let mine = repo.list_by_email("a@x.com").await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(repo.list_by_email("c@x.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deliver_then_delete() {
        let store = MemoryStore::new();
        let repo = CartRepository::new(&store);
        let InsertOutcome::Inserted(ack) = repo.add(&item("a@x.com", "p-1")).await.unwrap()
        else {
            panic!("expected insert");
        };
        let id = ack.inserted_id.to_string();

        let updated = repo.set_status(&id, CartStatus::Delivered).await.unwrap();
        assert_eq!(updated.modified_count, 1);
        let items = repo.list_by_email("a@x.com").await.unwrap();
        assert_eq!(items.first().unwrap().status(), CartStatus::Delivered);

        let deleted = repo.delete(&id).await.unwrap();
        assert_eq!(deleted.deleted_count, 1);
        assert!(repo.list_by_email("a@x.com").await.unwrap().is_empty());
    }
}
