// storelink/app/src/store/postgres.rs

//! Postgres backend: one `JSONB` document per row, merged with `doc || patch`.

use super::{BulkWriteResult, Collection, DocFilter, Document, DocumentStore, UpsertOutcome};
use crate::errors::{AppError, Result as AppResult};
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};

/// Document as returned to callers: stored JSON plus the row timestamps.
const RENDERED_DOC: &str = "doc || jsonb_build_object('createdAt', created_at, 'updatedAt', updated_at)";

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  /// Connects and applies pending migrations.
  pub async fn connect(database_url: &str) -> AppResult<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(10)
      .acquire_timeout(Duration::from_secs(5))
      .connect(database_url)
      .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Connected to Postgres and applied migrations.");
    Ok(Self { pool })
  }

  pub fn from_pool(pool: PgPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }
}

fn upsert_sql(collection: Collection) -> String {
  format!(
    "INSERT INTO {table} AS t (external_id, doc) VALUES ($1, $2) \
     ON CONFLICT (external_id) DO UPDATE \
       SET doc = t.doc || EXCLUDED.doc, updated_at = NOW() \
       WHERE (t.doc || EXCLUDED.doc) IS DISTINCT FROM t.doc \
     RETURNING (xmax = 0) AS inserted, {rendered} AS doc",
    table = collection.as_str(),
    rendered = RENDERED_DOC,
  )
}

fn find_one_sql(collection: Collection) -> String {
  format!(
    "SELECT {rendered} AS doc FROM {table} WHERE external_id = $1",
    table = collection.as_str(),
    rendered = RENDERED_DOC,
  )
}

fn with_key(collection: Collection, id: i64, mut patch: Document) -> JsonValue {
  patch.insert(collection.key_field().to_string(), json!(id));
  JsonValue::Object(patch)
}

/// One upsert on `conn`. Returns the outcome even when the row was left untouched.
async fn upsert_with(conn: &mut PgConnection, collection: Collection, id: i64, patch: Document) -> AppResult<UpsertOutcome> {
  let row: Option<(bool, JsonValue)> = sqlx::query_as(&upsert_sql(collection))
    .bind(id)
    .bind(with_key(collection, id, patch))
    .fetch_optional(&mut *conn)
    .await?;

  match row {
    Some((inserted, document)) => Ok(UpsertOutcome {
      document,
      inserted,
      modified: !inserted,
    }),
    // The conflict branch's WHERE filtered the row out: matched, unchanged.
    None => {
      let document: JsonValue = sqlx::query_scalar(&find_one_sql(collection))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::Internal(format!("{} {} vanished during upsert", collection.as_str(), id)))?;
      Ok(UpsertOutcome {
        document,
        inserted: false,
        modified: false,
      })
    }
  }
}

#[async_trait]
impl DocumentStore for PgStore {
  fn backend_name(&self) -> &'static str {
    "postgres"
  }

  async fn find_one(&self, collection: Collection, id: i64) -> AppResult<Option<JsonValue>> {
    let doc: Option<JsonValue> = sqlx::query_scalar(&find_one_sql(collection))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(doc)
  }

  async fn find_all(&self, collection: Collection, filter: &DocFilter) -> AppResult<Vec<JsonValue>> {
    let sql = format!(
      "SELECT {rendered} AS doc FROM {table} WHERE doc @> $1 ORDER BY created_at DESC, external_id DESC",
      table = collection.as_str(),
      rendered = RENDERED_DOC,
    );
    let docs: Vec<JsonValue> = sqlx::query_scalar(&sql)
      .bind(JsonValue::Object(filter.equals.clone()))
      .fetch_all(&self.pool)
      .await?;
    Ok(docs)
  }

  #[instrument(name = "store::pg_upsert_one", skip(self, collection, patch), fields(collection = collection.as_str()))]
  async fn upsert_one(&self, collection: Collection, id: i64, patch: Document) -> AppResult<UpsertOutcome> {
    let mut conn = self.pool.acquire().await?;
    upsert_with(&mut conn, collection, id, patch).await
  }

  async fn update_one(&self, collection: Collection, id: i64, patch: Document) -> AppResult<Option<JsonValue>> {
    let sql = format!(
      "UPDATE {table} SET doc = doc || $2, \
         updated_at = CASE WHEN (doc || $2) IS DISTINCT FROM doc THEN NOW() ELSE updated_at END \
       WHERE external_id = $1 \
       RETURNING {rendered} AS doc",
      table = collection.as_str(),
      rendered = RENDERED_DOC,
    );
    let doc: Option<JsonValue> = sqlx::query_scalar(&sql)
      .bind(id)
      .bind(with_key(collection, id, patch))
      .fetch_optional(&self.pool)
      .await?;
    Ok(doc)
  }

  async fn delete_one(&self, collection: Collection, id: i64) -> AppResult<bool> {
    let sql = format!("DELETE FROM {} WHERE external_id = $1", collection.as_str());
    let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
    Ok(result.rows_affected() > 0)
  }

  #[instrument(name = "store::pg_bulk_upsert", skip(self, collection, writes), fields(collection = collection.as_str(), count = writes.len()))]
  async fn bulk_upsert(&self, collection: Collection, writes: Vec<(i64, Document)>) -> AppResult<BulkWriteResult> {
    let mut tx = self.pool.begin().await?;
    let mut result = BulkWriteResult::default();
    for (id, patch) in writes {
      let outcome = upsert_with(&mut tx, collection, id, patch).await?;
      result.record(id, &outcome);
    }
    tx.commit().await?;
    Ok(result)
  }

  async fn health_check(&self) -> AppResult<()> {
    sqlx::query("SELECT 1").execute(&self.pool).await?;
    Ok(())
  }
}
