//! Repositorios de datos
//!
//! `CollectionClient` abstrae el backend (PostgreSQL o memoria) y
//! `EntityRepository` añade validación y tipado por entidad.

pub mod collection_client;
pub mod entity_repository;
pub mod memory_collection_client;
pub mod pg_collection_client;

pub use collection_client::{CollectionClient, JsonRecord, StoreError, StoreResult};
pub use entity_repository::EntityRepository;
pub use memory_collection_client::InMemoryCollectionClient;
pub use pg_collection_client::PgCollectionClient;
