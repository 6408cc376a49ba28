//! Product repository.

use fitlife_core::{DocumentId, InsertOneResult, Product};

use super::{
    Collection, DocumentStore, Filter, FindOptions, StoreError, from_document, to_document,
};

/// Repository for product documents.
pub struct ProductRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Every product in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store query fails or a document is malformed.
    pub async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        self.store
            .find(Collection::Products, &Filter::all(), &FindOptions::default())
            .await?
            .into_iter()
            .map(|doc| from_document(Collection::Products, doc))
            .collect()
    }

    /// Featured products, cheapest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store query fails or a document is malformed.
    pub async fn list_best(&self) -> Result<Vec<Product>, StoreError> {
        let filter = Filter::all().where_eq(Product::IS_BEST_FIELD, true);
        self.store
            .find(
                Collection::Products,
                &filter,
                &FindOptions::sort_ascending(Product::PRICE_FIELD),
            )
            .await?
            .into_iter()
            .map(|doc| from_document(Collection::Products, doc))
            .collect()
    }

    /// Look up one product.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidId` if `id` is not a document identifier,
    /// or `StoreError` if the store query fails.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Product>, StoreError> {
        let id: DocumentId = id.parse()?;
        self.store
            .find_one(Collection::Products, &Filter::by_id(id))
            .await?
            .map(|doc| from_document(Collection::Products, doc))
            .transpose()
    }

    /// Store a new product.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the insert fails.
    pub async fn create(&self, product: &Product) -> Result<InsertOneResult, StoreError> {
        self.store
            .insert_one(Collection::Products, to_document(product)?)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::MemoryStore;

    fn product(value: serde_json::Value) -> Product {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_list_best_filters_and_sorts() {
        let store = MemoryStore::new();
        let repo = ProductRepository::new(&store);
        for value in [
            json!({ "name": "Bench", "price": 199, "isBest": true }),
            json!({ "name": "Band", "price": 9.99, "isBest": false }),
            json!({ "name": "Mat", "price": 25, "isBest": true }),
            json!({ "name": "Rope", "price": 12 }),
        ] {
            repo.create(&product(value)).await.unwrap();
        }

        let best = repo.list_best().await.unwrap();
        let names: Vec<_> = best.iter().map(|p| p.extra["name"].clone()).collect();
        assert_eq!(names, vec![json!("Mat"), json!("Bench")]);
        assert!(best.iter().all(Product::is_best));
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let store = MemoryStore::new();
        let repo = ProductRepository::new(&store);
        let ack = repo
            .create(&product(json!({ "name": "Kettlebell" })))
            .await
            .unwrap();

        let found = repo
            .get_by_id(&ack.inserted_id.to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, Some(ack.inserted_id));

        let missing = repo
            .get_by_id(&DocumentId::generate().to_string())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_get_by_malformed_id_is_an_error() {
        let store = MemoryStore::new();
        let err = ProductRepository::new(&store)
            .get_by_id("123")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));
    }
}
