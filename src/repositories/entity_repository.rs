//! Repositorio genérico de entidades
//!
//! Traduce entre los registros JSON del backend y las entidades tipadas.
//! Los formularios se validan antes de cualquier llamada al backend.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use super::collection_client::{CollectionClient, JsonRecord, OrderBy, SelectOptions, StoreError};
use crate::listview::SortDirection;
use crate::models::entity::{from_json_record, Entity};
use crate::utils::errors::{validation_error, AppError, AppResult};

pub struct EntityRepository<E> {
    store: Arc<dyn CollectionClient>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> EntityRepository<E> {
    pub fn new(store: Arc<dyn CollectionClient>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    /// Orden por defecto pedido al backend cuando la clave es una columna
    fn default_order() -> Option<OrderBy> {
        let config = E::list_config();
        let key = config.default_sort_key;
        if !E::COLLECTION.has_column(key) {
            return None;
        }
        Some(match config.default_sort_direction {
            SortDirection::Ascending => OrderBy::asc(key),
            SortDirection::Descending => OrderBy::desc(key),
        })
    }

    /// Todos los registros con sus joins resueltos
    pub async fn list(&self) -> AppResult<Vec<E>> {
        let options = SelectOptions {
            joins: E::joins(),
            order_by: Self::default_order(),
        };
        let rows = self.store.select_all(E::COLLECTION, &options).await?;
        debug!("📋 {} filas leídas de {}", rows.len(), E::COLLECTION);
        rows.into_iter().map(from_json_record::<E>).collect()
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<E>> {
        let row = self
            .store
            .select_one(E::COLLECTION, id, &E::joins())
            .await?;
        row.map(from_json_record::<E>).transpose()
    }

    pub async fn get(&self, id: Uuid) -> AppResult<E> {
        self.find_by_id(id).await?.ok_or_else(|| {
            StoreError::NotFound {
                collection: E::COLLECTION,
                id,
            }
            .into()
        })
    }

    pub async fn create(&self, request: E::Create) -> AppResult<E> {
        request.validate()?;
        let record = E::insert_record(request)?;
        let inserted = self.store.insert(E::COLLECTION, record).await?;
        let entity = from_json_record::<E>(inserted)?;
        info!("✅ {} creado: {}", E::COLLECTION, entity.id());
        self.reload(entity).await
    }

    /// Edición parcial: solo se escriben las claves presentes en `body` y un
    /// `null` explícito vacía la columna salvo que sea obligatoria
    pub async fn update(&self, id: Uuid, body: JsonRecord) -> AppResult<E> {
        let request: E::Update = serde_json::from_value(serde_json::Value::Object(body.clone()))
            .map_err(|e| AppError::BadRequest(format!("Invalid {} form: {}", E::COLLECTION, e)))?;
        request.validate()?;
        if let Some(column) = body
            .iter()
            .filter(|(_, value)| value.is_null())
            .find_map(|(key, _)| E::COLLECTION.required_column(key))
        {
            return Err(validation_error(column, "This field cannot be empty"));
        }
        let patch = E::update_patch(request, &body)?;
        let updated = self.store.update_by_id(E::COLLECTION, id, patch).await?;
        let entity = from_json_record::<E>(updated)?;
        info!("✏️ {} actualizado: {}", E::COLLECTION, id);
        self.reload(entity).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.store.delete_by_id(E::COLLECTION, id).await?;
        info!("🗑️ {} eliminado: {}", E::COLLECTION, id);
        Ok(())
    }

    /// Vuelve a leer con joins para devolver las etiquetas resueltas
    async fn reload(&self, entity: E) -> AppResult<E> {
        if E::joins().is_empty() {
            return Ok(entity);
        }
        Ok(self.find_by_id(entity.id()).await?.unwrap_or(entity))
    }
}
