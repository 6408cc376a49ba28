//! Document store access.
//!
//! # Collections
//!
//! - `products` - Catalogue products
//! - `users` - Registered users (unique on `email`)
//! - `carts` - Cart items (unique on `product_id`)
//!
//! Handlers never talk to a backend directly: they go through the typed
//! repositories ([`ProductRepository`], [`UserRepository`],
//! [`CartRepository`]) which issue single operations against a
//! [`DocumentStore`]. Two stores exist:
//!
//! - [`PgDocumentStore`] - `PostgreSQL` JSONB tables (production)
//! - [`MemoryStore`] - process-local maps (tests and `memory://` URLs)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p fitlife-cli -- migrate
//! ```

pub mod carts;
pub mod memory;
pub mod postgres;
pub mod products;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use fitlife_core::{
    DeleteResult, DocumentId, DocumentIdError, ID_FIELD, InsertOneResult, UpdateResult,
};

pub use carts::CartRepository;
pub use memory::MemoryStore;
pub use postgres::{MIGRATOR, PgDocumentStore, create_pool};
pub use products::ProductRepository;
pub use users::UserRepository;

/// A stored document: a JSON object whose `_id` key holds its identifier.
pub type Document = serde_json::Map<String, Value>;

/// URL scheme selecting the in-memory store.
pub const MEMORY_URL_SCHEME: &str = "memory://";

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store does not match the document model.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A path or filter identifier could not be parsed.
    #[error(transparent)]
    InvalidId(#[from] DocumentIdError),

    /// Unique key violation (duplicate email or product reference).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// The three logical collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Products,
    Users,
    Carts,
}

impl Collection {
    /// Backing table (schema-qualified) in `PostgreSQL`.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Products => "fitlife.products",
            Self::Users => "fitlife.users",
            Self::Carts => "fitlife.carts",
        }
    }

    /// Field that must be unique across the collection, if any.
    #[must_use]
    pub const fn unique_key(self) -> Option<&'static str> {
        match self {
            Self::Products => None,
            Self::Users => Some("email"),
            Self::Carts => Some("product_id"),
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Products => "products",
            Self::Users => "users",
            Self::Carts => "carts",
        })
    }
}

/// Field-equality filter.
///
/// Every clause must hold. A `null` value also matches a document that lacks
/// the field entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    /// Match every document.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Match the document with the given identifier.
    #[must_use]
    pub fn by_id(id: DocumentId) -> Self {
        Self::all().where_eq(ID_FIELD, id.to_string())
    }

    /// Add an equality clause.
    #[must_use]
    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.clauses.push((field.to_owned(), value.into()));
        self
    }

    /// The clauses in insertion order.
    #[must_use]
    pub fn clauses(&self) -> &[(String, Value)] {
        &self.clauses
    }

    /// Evaluate the filter against a document.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(field, value)| document.get(field).unwrap_or(&Value::Null) == value)
    }
}

/// Options for [`DocumentStore::find`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Order ascending by one field; insertion order otherwise. Missing
    /// values sort with `null`, first.
    pub sort: Option<String>,
}

impl FindOptions {
    /// Sort ascending on `field`.
    #[must_use]
    pub fn sort_ascending(field: &str) -> Self {
        Self {
            sort: Some(field.to_owned()),
        }
    }
}

/// Outcome of an insert guarded by a unique key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The document was stored.
    Inserted(InsertOneResult),
    /// A document with the same key already exists; nothing was written.
    Duplicate,
}

/// Single-operation document store.
///
/// Each method is one round trip against the backend. Nothing is retried.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents matching `filter`.
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError>;

    /// The first document matching `filter`.
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError>;

    /// Store a new document under a freshly generated identifier.
    ///
    /// Any `_id` already present in `document` is ignored. Fails with
    /// [`StoreError::Conflict`] when the collection's unique key is taken.
    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<InsertOneResult, StoreError>;

    /// Merge `set` into the first document matching `filter`.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
    ) -> Result<UpdateResult, StoreError>;

    /// Remove the first document matching `filter`.
    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<DeleteResult, StoreError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Open the store selected by `database_url`.
///
/// `memory://` selects a fresh [`MemoryStore`]; anything else is treated as a
/// `PostgreSQL` connection string.
///
/// # Errors
///
/// Returns `StoreError::Database` if the `PostgreSQL` pool cannot connect.
pub async fn connect(database_url: &SecretString) -> Result<Arc<dyn DocumentStore>, StoreError> {
    if database_url.expose_secret().starts_with(MEMORY_URL_SCHEME) {
        tracing::warn!("Using in-memory document store; data is lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = create_pool(database_url).await?;
    Ok(Arc::new(PgDocumentStore::new(pool)))
}

/// Serialize a typed document into its stored form.
pub(crate) fn to_document<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(document)) => Ok(document),
        Ok(other) => Err(StoreError::DataCorruption(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(StoreError::DataCorruption(format!(
            "document serialization failed: {e}"
        ))),
    }
}

/// Deserialize a stored document into its typed form.
pub(crate) fn from_document<T: DeserializeOwned>(
    collection: Collection,
    document: Document,
) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(document)).map_err(|e| {
        StoreError::DataCorruption(format!("invalid document in {collection}: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => Document::new(),
        }
    }

    #[test]
    fn test_filter_all_matches_everything() {
        assert!(Filter::all().matches(&doc(json!({ "a": 1 }))));
        assert!(Filter::all().matches(&Document::new()));
    }

    #[test]
    fn test_filter_equality_is_exact() {
        let filter = Filter::all().where_eq("email", "a@fitlifenow.com");
        assert!(filter.matches(&doc(json!({ "email": "a@fitlifenow.com" }))));
        assert!(!filter.matches(&doc(json!({ "email": "A@fitlifenow.com" }))));
        assert!(!filter.matches(&doc(json!({}))));
    }

    #[test]
    fn test_filter_null_matches_missing_field() {
        let filter = Filter::all().where_eq("product_id", Value::Null);
        assert!(filter.matches(&doc(json!({ "name": "x" }))));
        assert!(!filter.matches(&doc(json!({ "product_id": "p-1" }))));
    }

    #[test]
    fn test_unique_keys() {
        assert_eq!(Collection::Users.unique_key(), Some("email"));
        assert_eq!(Collection::Carts.unique_key(), Some("product_id"));
        assert_eq!(Collection::Products.unique_key(), None);
    }
}
