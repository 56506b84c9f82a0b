//! Cliente de colecciones en memoria
//!
//! Mismo contrato que el cliente PostgreSQL; se usa en tests y en
//! `STORE_BACKEND=memory` para levantar el dashboard sin base de datos.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::collection_client::{CollectionClient, JsonRecord, OrderBy, StoreError, StoreResult};
use crate::listview::{compare, SortDirection};
use crate::models::collection::Collection;

#[derive(Clone, Default)]
pub struct InMemoryCollectionClient {
    tables: Arc<RwLock<HashMap<Collection, Vec<JsonRecord>>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryCollectionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Carga filas tal cual, sin pasar por la lista blanca de columnas
    pub async fn seed(&self, collection: Collection, rows: Vec<JsonRecord>) {
        let mut tables = self.tables.write().await;
        let count = rows.len();
        tables.entry(collection).or_default().extend(rows);
        info!("🌱 {} filas cargadas en {}", count, collection);
    }

    /// Simula una caída del backend: toda operación falla
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("connection refused".to_string()));
        }
        Ok(())
    }

    fn filter_writable(collection: Collection, record: JsonRecord) -> JsonRecord {
        record
            .into_iter()
            .filter(|(column, _)| collection.is_writable(column))
            .collect()
    }
}

fn row_id(row: &JsonRecord) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

#[async_trait]
impl CollectionClient for InMemoryCollectionClient {
    async fn select_rows(
        &self,
        collection: Collection,
        order_by: Option<&OrderBy>,
    ) -> StoreResult<Vec<JsonRecord>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut rows = tables.get(&collection).cloned().unwrap_or_default();

        if let Some(order) = order_by {
            if !collection.has_column(&order.field) {
                return Err(StoreError::InvalidQuery(format!(
                    "column '{}' does not exist on {}",
                    order.field, collection
                )));
            }
            let direction = if order.ascending {
                SortDirection::Ascending
            } else {
                SortDirection::Descending
            };
            rows.sort_by(|a, b| compare(a, b, &order.field, direction));
        }
        debug!("📥 {} filas leídas de {}", rows.len(), collection);
        Ok(rows)
    }

    async fn select_by_id(&self, collection: Collection, id: Uuid) -> StoreResult<Option<JsonRecord>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let id = id.to_string();
        Ok(tables
            .get(&collection)
            .and_then(|rows| rows.iter().find(|row| row_id(row) == Some(id.as_str())))
            .cloned())
    }

    async fn insert(&self, collection: Collection, record: JsonRecord) -> StoreResult<JsonRecord> {
        self.check_available()?;
        let mut row = Self::filter_writable(collection, record);
        if row.is_empty() {
            return Err(StoreError::InvalidQuery(format!(
                "no writable columns supplied for {}",
                collection
            )));
        }
        row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        row.insert(
            "created_at".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );

        let mut tables = self.tables.write().await;
        tables.entry(collection).or_default().push(row.clone());
        Ok(row)
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: Uuid,
        patch: JsonRecord,
    ) -> StoreResult<JsonRecord> {
        self.check_available()?;
        let patch = Self::filter_writable(collection, patch);
        let mut tables = self.tables.write().await;
        let id_text = id.to_string();
        let row = tables
            .get_mut(&collection)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|row| row_id(row) == Some(id_text.as_str()))
            })
            .ok_or(StoreError::NotFound { collection, id })?;

        for (column, value) in patch {
            row.insert(column, value);
        }
        Ok(row.clone())
    }

    async fn delete_by_id(&self, collection: Collection, id: Uuid) -> StoreResult<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let id_text = id.to_string();
        let rows = tables.entry(collection).or_default();
        let before = rows.len();
        rows.retain(|row| row_id(row) != Some(id_text.as_str()));
        if rows.len() == before {
            return Err(StoreError::NotFound { collection, id });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::collection_client::{Join, SelectOptions};
    use serde_json::json;

    fn obj(value: Value) -> JsonRecord {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_drops_unknown_columns() {
        let client = InMemoryCollectionClient::new();
        let row = client
            .insert(
                Collection::Vehicles,
                obj(json!({"registration_number": "CA 1", "id": "forged", "bogus": 1})),
            )
            .await
            .unwrap();
        assert_ne!(row["id"], json!("forged"));
        assert!(row.get("bogus").is_none());
        assert!(row.get("created_at").is_some());
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let client = InMemoryCollectionClient::new();
        let missing = Uuid::new_v4();
        let err = client
            .update_by_id(Collection::Drivers, missing, obj(json!({"status": "inactive"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(client.delete_by_id(Collection::Drivers, missing).await.is_err());
    }

    #[tokio::test]
    async fn test_select_all_orders_and_joins() {
        let client = InMemoryCollectionClient::new();
        let vehicle_id = Uuid::new_v4();
        client
            .seed(
                Collection::Vehicles,
                vec![obj(json!({"id": vehicle_id.to_string(), "registration_number": "CA 9"}))],
            )
            .await;
        client
            .seed(
                Collection::Services,
                vec![
                    obj(json!({"id": Uuid::new_v4().to_string(), "vehicle_id": vehicle_id.to_string(), "service_date": "2024-03-01"})),
                    obj(json!({"id": Uuid::new_v4().to_string(), "vehicle_id": null, "service_date": "2024-01-15"})),
                ],
            )
            .await;

        let options = SelectOptions {
            joins: vec![Join {
                collection: Collection::Vehicles,
                foreign_key: "vehicle_id",
                alias: "vehicle",
                fields: &["registration_number"],
            }],
            order_by: Some(OrderBy::desc("service_date")),
        };
        let rows = client.select_all(Collection::Services, &options).await.unwrap();
        assert_eq!(rows[0]["service_date"], json!("2024-03-01"));
        assert_eq!(rows[0]["vehicle"]["registration_number"], json!("CA 9"));
        assert_eq!(rows[1]["vehicle"], Value::Null);
    }

    #[tokio::test]
    async fn test_unavailable_backend_fails_every_call() {
        let client = InMemoryCollectionClient::new();
        client.set_unavailable(true);
        let err = client
            .select_all(Collection::Vehicles, &SelectOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Backend("connection refused".to_string()));
    }

    #[tokio::test]
    async fn test_order_by_unknown_column_is_rejected() {
        let client = InMemoryCollectionClient::new();
        let err = client
            .select_rows(Collection::Vehicles, Some(&OrderBy::asc("nope")))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidQuery(_)));
    }
}
