//! Process-local [`DocumentStore`] used by tests and `memory://` URLs.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use fitlife_core::{DeleteResult, DocumentId, ID_FIELD, InsertOneResult, UpdateResult};

use super::{Collection, Document, DocumentStore, Filter, FindOptions, StoreError};

/// In-memory document store.
///
/// Documents are kept in insertion order per collection. Unique keys are
/// checked under the write lock, so concurrent inserts of the same key
/// admit exactly one.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Rank of a JSON value's type when ordering mixed values: null, numbers,
/// strings, objects, arrays, booleans.
const fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.total_cmp(&b)
        }
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Missing fields compare as `null`, ahead of every other value.
fn compare_field(a: &Document, b: &Document, field: &str) -> Ordering {
    compare_values(
        a.get(field).unwrap_or(&Value::Null),
        b.get(field).unwrap_or(&Value::Null),
    )
}

fn has_key_value(document: &Document, key: &str, value: &Value) -> bool {
    document.get(key).is_some_and(|existing| existing == value)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let mut found: Vec<Document> = collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default();

        if let Some(field) = &options.sort {
            found.sort_by(|a, b| compare_field(a, b, field));
        }

        Ok(found)
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)).cloned()))
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut document: Document,
    ) -> Result<InsertOneResult, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();

        if let Some(key) = collection.unique_key()
            && let Some(value) = document.get(key)
            && docs.iter().any(|d| has_key_value(d, key, value))
        {
            return Err(StoreError::Conflict(format!(
                "{collection} {key} already exists"
            )));
        }

        let id = DocumentId::generate();
        document.insert(ID_FIELD.to_owned(), Value::String(id.to_string()));
        docs.push(document);

        Ok(InsertOneResult::new(id))
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        mut set: Document,
    ) -> Result<UpdateResult, StoreError> {
        set.remove(ID_FIELD);
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(UpdateResult::new(0, 0));
        };

        let Some(position) = docs.iter().position(|d| filter.matches(d)) else {
            return Ok(UpdateResult::new(0, 0));
        };

        if let Some(key) = collection.unique_key()
            && let Some(value) = set.get(key)
            && docs
                .iter()
                .enumerate()
                .any(|(i, d)| i != position && has_key_value(d, key, value))
        {
            return Err(StoreError::Conflict(format!(
                "{collection} {key} already exists"
            )));
        }

        let Some(target) = docs.get_mut(position) else {
            return Ok(UpdateResult::new(0, 0));
        };

        let mut modified = false;
        for (field, value) in set {
            if target.get(&field) != Some(&value) {
                target.insert(field, value);
                modified = true;
            }
        }

        Ok(UpdateResult::new(1, u64::from(modified)))
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<DeleteResult, StoreError> {
        let mut collections = self.collections.write().await;
        let removed = collections
            .get_mut(&collection)
            .and_then(|docs| {
                docs.iter()
                    .position(|d| filter.matches(d))
                    .map(|position| docs.remove(position))
            })
            .is_some();

        Ok(DeleteResult::new(u64::from(removed)))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
