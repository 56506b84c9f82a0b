//! Cliente de colecciones sobre PostgreSQL
//!
//! Cada operación es una sola sentencia sobre una sola tabla. Las filas
//! viajan como JSON (`to_jsonb` / `jsonb_populate_record`) para que el mismo
//! código sirva a todas las entidades; los nombres de columna salen siempre
//! de la lista blanca de `Collection`.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, error};
use uuid::Uuid;

use super::collection_client::{CollectionClient, JsonRecord, OrderBy, StoreError, StoreResult};
use crate::models::collection::Collection;

#[derive(Clone)]
pub struct PgCollectionClient {
    pool: PgPool,
}

impl PgCollectionClient {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn writable_columns(collection: Collection, record: &JsonRecord) -> StoreResult<Vec<&'static str>> {
        let columns: Vec<&'static str> = collection
            .columns()
            .iter()
            .copied()
            .filter(|column| collection.is_writable(column) && record.contains_key(*column))
            .collect();
        if columns.is_empty() {
            return Err(StoreError::InvalidQuery(format!(
                "no writable columns supplied for {}",
                collection
            )));
        }
        Ok(columns)
    }
}

fn backend_error(context: &str, e: sqlx::Error) -> StoreError {
    error!("❌ Error de base de datos ({}): {}", context, e);
    match e {
        sqlx::Error::Database(db) => StoreError::Backend(db.message().to_string()),
        other => StoreError::Backend(other.to_string()),
    }
}

fn into_record(value: Value) -> StoreResult<JsonRecord> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Backend(format!(
            "unexpected row shape: {}",
            other
        ))),
    }
}

/// `SELECT` ordenado; la columna de orden debe existir en la colección
pub fn select_sql(collection: Collection, order_by: Option<&OrderBy>) -> StoreResult<String> {
    let mut sql = format!("SELECT to_jsonb(t) FROM {} t", collection.table_name());
    if let Some(order) = order_by {
        if !collection.has_column(&order.field) {
            return Err(StoreError::InvalidQuery(format!(
                "column '{}' does not exist on {}",
                order.field, collection
            )));
        }
        let direction = if order.ascending { "ASC" } else { "DESC" };
        sql.push_str(&format!(" ORDER BY t.{} {}", order.field, direction));
    }
    Ok(sql)
}

pub fn insert_sql(collection: Collection, columns: &[&str]) -> String {
    let list = columns.join(", ");
    format!(
        "INSERT INTO {table} AS t ({list}) SELECT {list} FROM jsonb_populate_record(NULL::{table}, $1) RETURNING to_jsonb(t)",
        table = collection.table_name(),
        list = list,
    )
}

pub fn update_sql(collection: Collection, columns: &[&str]) -> String {
    let assignments = columns
        .iter()
        .map(|column| format!("{column} = r.{column}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {table} AS t SET {assignments} FROM jsonb_populate_record(NULL::{table}, $2) AS r WHERE t.id = $1 RETURNING to_jsonb(t)",
        table = collection.table_name(),
        assignments = assignments,
    )
}

#[async_trait]
impl CollectionClient for PgCollectionClient {
    async fn select_rows(
        &self,
        collection: Collection,
        order_by: Option<&OrderBy>,
    ) -> StoreResult<Vec<JsonRecord>> {
        let sql = select_sql(collection, order_by)?;
        debug!("🔍 {}", sql);
        let rows: Vec<Value> = sqlx::query_scalar(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| backend_error("select", e))?;
        rows.into_iter().map(into_record).collect()
    }

    async fn select_by_id(&self, collection: Collection, id: Uuid) -> StoreResult<Option<JsonRecord>> {
        let sql = format!(
            "SELECT to_jsonb(t) FROM {} t WHERE t.id = $1",
            collection.table_name()
        );
        let row: Option<Value> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| backend_error("select_by_id", e))?;
        row.map(into_record).transpose()
    }

    async fn insert(&self, collection: Collection, record: JsonRecord) -> StoreResult<JsonRecord> {
        let columns = Self::writable_columns(collection, &record)?;
        let sql = insert_sql(collection, &columns);
        debug!("📝 {}", sql);
        let row: Value = sqlx::query_scalar(&sql)
            .bind(Json(Value::Object(record)))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| backend_error("insert", e))?;
        into_record(row)
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: Uuid,
        patch: JsonRecord,
    ) -> StoreResult<JsonRecord> {
        let columns = Self::writable_columns(collection, &patch)?;
        let sql = update_sql(collection, &columns);
        debug!("📝 {}", sql);
        let row: Option<Value> = sqlx::query_scalar(&sql)
            .bind(id)
            .bind(Json(Value::Object(patch)))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| backend_error("update", e))?;
        row.map(into_record)
            .transpose()?
            .ok_or(StoreError::NotFound { collection, id })
    }

    async fn delete_by_id(&self, collection: Collection, id: Uuid) -> StoreResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = $1", collection.table_name());
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| backend_error("delete", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { collection, id });
        }
        Ok(())
    }
}
