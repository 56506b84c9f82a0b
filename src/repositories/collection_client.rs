//! Cliente de colecciones remotas
//!
//! Contrato mínimo con el backend: leer todo, insertar, actualizar y borrar
//! por id. Los joins se resuelven aquí una sola vez para todas las
//! implementaciones, con las colecciones relacionadas pedidas en paralelo.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::collection::Collection;

/// Registro tal como lo devuelve el backend
pub type JsonRecord = Map<String, Value>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Mensaje del backend tal cual (red, restricciones, permisos)
    #[error("{0}")]
    Backend(String),

    #[error("{collection} with id '{id}' not found")]
    NotFound { collection: Collection, id: Uuid },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Relación de clave foránea a resolver al leer
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub collection: Collection,
    pub foreign_key: &'static str,
    pub alias: &'static str,
    pub fields: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub ascending: bool,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: true,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectOptions {
    pub joins: Vec<Join>,
    pub order_by: Option<OrderBy>,
}

#[async_trait]
pub trait CollectionClient: Send + Sync {
    /// Filas de una colección sin joins
    async fn select_rows(
        &self,
        collection: Collection,
        order_by: Option<&OrderBy>,
    ) -> StoreResult<Vec<JsonRecord>>;

    async fn select_by_id(&self, collection: Collection, id: Uuid) -> StoreResult<Option<JsonRecord>>;

    async fn insert(&self, collection: Collection, record: JsonRecord) -> StoreResult<JsonRecord>;

    async fn update_by_id(
        &self,
        collection: Collection,
        id: Uuid,
        patch: JsonRecord,
    ) -> StoreResult<JsonRecord>;

    async fn delete_by_id(&self, collection: Collection, id: Uuid) -> StoreResult<()>;

    /// Todas las filas con sus joins resueltos
    async fn select_all(
        &self,
        collection: Collection,
        options: &SelectOptions,
    ) -> StoreResult<Vec<JsonRecord>> {
        let base = self.select_rows(collection, options.order_by.as_ref());
        let related = try_join_all(
            options
                .joins
                .iter()
                .map(|join| self.select_rows(join.collection, None)),
        );
        let (mut rows, related) = futures::try_join!(base, related)?;

        for (join, targets) in options.joins.iter().zip(related) {
            debug!(
                "🔗 Join {}.{} -> {} ({} filas)",
                collection,
                join.foreign_key,
                join.collection,
                targets.len()
            );
            attach_join(&mut rows, join, &targets);
        }
        Ok(rows)
    }

    /// Una fila con sus joins resueltos
    async fn select_one(
        &self,
        collection: Collection,
        id: Uuid,
        joins: &[Join],
    ) -> StoreResult<Option<JsonRecord>> {
        let Some(row) = self.select_by_id(collection, id).await? else {
            return Ok(None);
        };
        let mut rows = vec![row];
        for join in joins {
            let targets = self.select_rows(join.collection, None).await?;
            attach_join(&mut rows, join, &targets);
        }
        Ok(rows.pop())
    }
}

/// Anida bajo `join.alias` los campos del registro referenciado. Una clave
/// nula o colgante deja `null` en el alias.
pub fn attach_join(rows: &mut [JsonRecord], join: &Join, targets: &[JsonRecord]) {
    let index: HashMap<&str, &JsonRecord> = targets
        .iter()
        .filter_map(|target| target.get("id").and_then(Value::as_str).map(|id| (id, target)))
        .collect();

    for row in rows.iter_mut() {
        let linked = row
            .get(join.foreign_key)
            .and_then(Value::as_str)
            .and_then(|fk| index.get(fk))
            .map(|target| {
                let subset: JsonRecord = join
                    .fields
                    .iter()
                    .map(|field| {
                        (
                            field.to_string(),
                            target.get(*field).cloned().unwrap_or(Value::Null),
                        )
                    })
                    .collect();
                Value::Object(subset)
            })
            .unwrap_or(Value::Null);
        row.insert(join.alias.to_string(), linked);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> JsonRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_attach_join_resolves_and_tolerates_dangling() {
        let vehicle_id = Uuid::new_v4();
        let mut rows = vec![
            obj(json!({"id": "s1", "vehicle_id": vehicle_id.to_string()})),
            obj(json!({"id": "s2", "vehicle_id": Uuid::new_v4().to_string()})),
            obj(json!({"id": "s3", "vehicle_id": null})),
        ];
        let targets = vec![obj(json!({
            "id": vehicle_id.to_string(),
            "registration_number": "CA 1",
            "make": "Ford",
        }))];
        let join = Join {
            collection: Collection::Vehicles,
            foreign_key: "vehicle_id",
            alias: "vehicle",
            fields: &["registration_number", "model"],
        };

        attach_join(&mut rows, &join, &targets);

        assert_eq!(
            rows[0]["vehicle"],
            json!({"registration_number": "CA 1", "model": null})
        );
        assert_eq!(rows[1]["vehicle"], Value::Null);
        assert_eq!(rows[2]["vehicle"], Value::Null);
    }
}
