//! `PostgreSQL` implementation of [`DocumentStore`].
//!
//! Each collection is a table of `(id UUID, doc JSONB, created_at)`. The
//! identifier lives in the `id` column and is spliced back into the document
//! under `_id` when read. Uniqueness of user emails and cart product
//! references is enforced by expression indexes (see the migrations), so
//! concurrent duplicate inserts resolve to exactly one winner.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use fitlife_core::{
    DeleteResult, DocumentId, DocumentIdError, ID_FIELD, InsertOneResult, UpdateResult,
};

use super::{Collection, Document, DocumentStore, Filter, FindOptions, StoreError};

/// Embedded schema migrations, applied by `fitlife-cli migrate`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Document store backed by JSONB tables.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Append `WHERE` clauses for `filter` to `builder`.
fn push_filter(
    builder: &mut QueryBuilder<'_, Postgres>,
    filter: &Filter,
) -> Result<(), StoreError> {
    builder.push(" WHERE TRUE");
    for (field, value) in filter.clauses() {
        if field == ID_FIELD {
            builder.push(" AND id = ").push_bind(id_from_value(value)?);
        } else {
            builder
                .push(" AND COALESCE(doc -> ")
                .push_bind(field.clone())
                .push("::text, 'null'::jsonb) = ")
                .push_bind(value.clone())
                .push("::jsonb");
        }
    }
    Ok(())
}

/// Append ascending sort keys for `field`, followed by a comma.
///
/// Values are ranked by type first (null or missing, numbers, strings,
/// objects, arrays, booleans) and then by jsonb order within a type.
fn push_sort(builder: &mut QueryBuilder<'_, Postgres>, field: &str) {
    builder
        .push("CASE jsonb_typeof(doc -> ")
        .push_bind(field.to_owned())
        .push(
            "::text) WHEN 'number' THEN 1 WHEN 'string' THEN 2 WHEN 'object' THEN 3 \
             WHEN 'array' THEN 4 WHEN 'boolean' THEN 5 ELSE 0 END, NULLIF(doc -> ",
        )
        .push_bind(field.to_owned())
        .push("::text, 'null'::jsonb), ");
}

/// Parse an `_id` filter value.
fn id_from_value(value: &Value) -> Result<DocumentId, StoreError> {
    value
        .as_str()
        .ok_or_else(|| DocumentIdError(value.to_string()))?
        .parse()
        .map_err(StoreError::InvalidId)
}

/// Rebuild a document from its row.
fn row_to_document(row: &PgRow) -> Result<Document, StoreError> {
    let id: DocumentId = row.try_get("id")?;
    let doc: Value = row.try_get("doc")?;

    let Value::Object(mut document) = doc else {
        return Err(StoreError::DataCorruption(format!(
            "document {id} is not a JSON object"
        )));
    };
    document.insert(ID_FIELD.to_owned(), Value::String(id.to_string()));
    Ok(document)
}

/// Translate unique violations into [`StoreError::Conflict`].
fn map_unique_violation(collection: Collection, e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let key = collection.unique_key().unwrap_or("key");
        return StoreError::Conflict(format!("{collection} {key} already exists"));
    }
    StoreError::Database(e)
}

fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let mut builder = QueryBuilder::new("SELECT id, doc FROM ");
        builder.push(collection.table());
        push_filter(&mut builder, filter)?;

        builder.push(" ORDER BY ");
        if let Some(field) = &options.sort {
            push_sort(&mut builder, field);
        }
        builder.push("created_at, id");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_document).collect()
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let mut builder = QueryBuilder::new("SELECT id, doc FROM ");
        builder.push(collection.table());
        push_filter(&mut builder, filter)?;
        builder.push(" ORDER BY created_at, id LIMIT 1");

        let row = builder.build().fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_document).transpose()
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut document: Document,
    ) -> Result<InsertOneResult, StoreError> {
        document.remove(ID_FIELD);
        let id = DocumentId::generate();

        let mut builder = QueryBuilder::new("INSERT INTO ");
        builder
            .push(collection.table())
            .push(" (id, doc) VALUES (")
            .push_bind(id)
            .push(", ")
            .push_bind(Value::Object(document))
            .push(")");

        builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(collection, e))?;

        Ok(InsertOneResult::new(id))
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        mut set: Document,
    ) -> Result<UpdateResult, StoreError> {
        set.remove(ID_FIELD);
        let set = Value::Object(set);
        let table = collection.table();

        let mut builder = QueryBuilder::new("WITH target AS (SELECT id, doc FROM ");
        builder.push(table);
        push_filter(&mut builder, filter)?;
        builder
            .push(" ORDER BY created_at, id LIMIT 1 FOR UPDATE), updated AS (UPDATE ")
            .push(table)
            .push(" AS t SET doc = t.doc || ")
            .push_bind(set.clone())
            .push("::jsonb FROM target WHERE t.id = target.id AND NOT (target.doc @> ")
            .push_bind(set)
            .push(
                "::jsonb) RETURNING t.id) \
                 SELECT (SELECT COUNT(*) FROM target) AS matched, \
                        (SELECT COUNT(*) FROM updated) AS modified",
            );

        let row = builder
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(collection, e))?;
        let matched: i64 = row.try_get("matched")?;
        let modified: i64 = row.try_get("modified")?;

        Ok(UpdateResult::new(count(matched), count(modified)))
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<DeleteResult, StoreError> {
        let table = collection.table();

        let mut builder = QueryBuilder::new("DELETE FROM ");
        builder.push(table).push(" WHERE id IN (SELECT id FROM ").push(table);
        push_filter(&mut builder, filter)?;
        builder.push(" ORDER BY created_at, id LIMIT 1)");

        let result = builder.build().execute(&self.pool).await?;
        Ok(DeleteResult::new(result.rows_affected()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_filter_sql_binds_every_value() {
        let id = DocumentId::generate();
        let filter = Filter::by_id(id).where_eq("email", "a@fitlifenow.com");

        let mut builder = QueryBuilder::<Postgres>::new("SELECT id, doc FROM fitlife.users");
        push_filter(&mut builder, &filter).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(
            builder.sql(),
            "SELECT id, doc FROM fitlife.users WHERE TRUE AND id = $1 \
             AND COALESCE(doc -> $2::text, 'null'::jsonb) = $3::jsonb"
        );
    }

    #[test]
    fn test_sort_sql_ranks_types_before_values() {
        let mut builder = QueryBuilder::<Postgres>::new("ORDER BY ");
        push_sort(&mut builder, "price");

        assert_eq!(
            builder.sql(),
            "ORDER BY CASE jsonb_typeof(doc -> $1::text) WHEN 'number' THEN 1 \
             WHEN 'string' THEN 2 WHEN 'object' THEN 3 WHEN 'array' THEN 4 \
             WHEN 'boolean' THEN 5 ELSE 0 END, NULLIF(doc -> $2::text, 'null'::jsonb), "
        );
    }

    #[test]
    fn test_malformed_id_is_rejected_before_query() {
        let filter = Filter::all().where_eq(ID_FIELD, "not-a-uuid");
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1");
        let err = push_filter(&mut builder, &filter).unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));
    }

    #[test]
    fn test_non_string_id_is_rejected() {
        assert!(matches!(
            id_from_value(&json!(42)),
            Err(StoreError::InvalidId(_))
        ));
    }
}
