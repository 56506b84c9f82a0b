//! Trait común de las entidades de la flota

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use super::collection::Collection;
use crate::listview::{EntityListConfig, Record};
use crate::repositories::collection_client::{Join, JsonRecord};
use crate::utils::errors::{AppError, AppResult};

pub trait Entity: Record + Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    /// Formulario de alta
    type Create: Validate + Serialize + DeserializeOwned + Send + 'static;
    /// Formulario de edición; los campos ausentes no se tocan
    type Update: Validate + Serialize + DeserializeOwned + Send + 'static;

    fn id(&self) -> Uuid;

    /// Búsqueda, filtros, orden por defecto, columnas y tarjetas de resumen
    fn list_config() -> EntityListConfig<Self>;

    fn joins() -> Vec<Join> {
        Vec::new()
    }

    /// Los campos nulos se omiten para que apliquen los valores por defecto del backend
    fn insert_record(create: Self::Create) -> AppResult<JsonRecord> {
        without_nulls(to_json_record(&create)?)
    }

    /// Solo los campos presentes en `provided`; un `null` explícito vacía la columna
    fn update_patch(update: Self::Update, provided: &JsonRecord) -> AppResult<JsonRecord> {
        Ok(only_provided(to_json_record(&update)?, provided))
    }
}

pub fn without_nulls(mut record: JsonRecord) -> AppResult<JsonRecord> {
    record.retain(|_, value| !value.is_null());
    Ok(record)
}

/// Descarta las claves que el cliente no envió
pub fn only_provided(mut record: JsonRecord, provided: &JsonRecord) -> JsonRecord {
    record.retain(|key, _| provided.contains_key(key));
    record
}

pub fn to_json_record<T: Serialize>(value: &T) -> AppResult<JsonRecord> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(AppError::Internal(format!(
            "Se esperaba un objeto JSON, se obtuvo {}",
            other
        ))),
        Err(e) => Err(AppError::Internal(format!("Error serializando registro: {}", e))),
    }
}

pub fn from_json_record<E: Entity>(record: JsonRecord) -> AppResult<E> {
    serde_json::from_value(serde_json::Value::Object(record)).map_err(|e| {
        AppError::Internal(format!(
            "Fila de {} con formato inesperado: {}",
            E::COLLECTION,
            e
        ))
    })
}
