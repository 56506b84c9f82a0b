//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::models::entity::Entity;
use crate::repositories::collection_client::CollectionClient;
use crate::repositories::entity_repository::EntityRepository;
use crate::services::jwt_service::JwtService;
use crate::storage::blob_store::BlobStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CollectionClient>,
    pub blobs: Arc<dyn BlobStore>,
    pub jwt: JwtService,
    pub config: EnvironmentConfig,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CollectionClient>,
        blobs: Arc<dyn BlobStore>,
        jwt: JwtService,
        config: EnvironmentConfig,
    ) -> Self {
        Self {
            store,
            blobs,
            jwt,
            config,
        }
    }

    /// Repositorio tipado sobre el cliente compartido
    pub fn repository<E: Entity>(&self) -> EntityRepository<E> {
        EntityRepository::new(self.store.clone())
    }
}
