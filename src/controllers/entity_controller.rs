//! Controlador genérico de entidades
//!
//! Une el repositorio, el pipeline de listados y los permisos del rol. Un
//! mismo controlador sirve a las nueve colecciones.

use std::marker::PhantomData;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::{ApiResponse, ListQuery};
use crate::listview::{export_file_name, ListPage, ListViewController, ViewContext};
use crate::models::Entity;
use crate::repositories::collection_client::{JsonRecord, StoreError};
use crate::services::jwt_service::Session;
use crate::state::AppState;
use crate::utils::errors::{forbidden_error, AppError, AppResult};

/// CSV listo para descargar
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

pub struct EntityController<E> {
    state: AppState,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> EntityController<E> {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            _entity: PhantomData,
        }
    }

    fn ensure_view(&self, session: &Session) -> AppResult<()> {
        if session.role.can_view(E::COLLECTION) {
            Ok(())
        } else {
            Err(forbidden_error(
                &format!("view {}", E::COLLECTION),
                "insufficient role",
            ))
        }
    }

    fn ensure_write(&self, session: &Session) -> AppResult<()> {
        if session.role.can_write(E::COLLECTION) {
            Ok(())
        } else {
            Err(forbidden_error(
                &format!("modify {}", E::COLLECTION),
                "insufficient role",
            ))
        }
    }

    fn ensure_delete(&self, session: &Session) -> AppResult<()> {
        if session.role.can_delete(E::COLLECTION) {
            Ok(())
        } else {
            Err(forbidden_error(
                &format!("delete from {}", E::COLLECTION),
                "requires manager role",
            ))
        }
    }

    /// Carga la colección completa y aplica los parámetros del listado.
    /// Un fallo del backend deja el listado vacío con el mensaje en `error`.
    async fn load(&self, session: &Session, query: &ListQuery) -> AppResult<ListViewController<E>> {
        self.ensure_view(session)?;

        let mut config = E::list_config();
        config.default_page_size = self.state.config.default_page_size;
        let mut controller = ListViewController::new(config, ViewContext::new(session.role));

        let ticket = controller.begin_load();
        match self.state.repository::<E>().list().await {
            Ok(records) => {
                controller.data_loaded_for(ticket, records);
            }
            Err(AppError::Store(err)) => {
                warn!("⚠️ No se pudo cargar {}: {}", E::COLLECTION, err);
                controller.load_failed(ticket, err.to_string());
            }
            Err(err) => return Err(err),
        }

        query.apply(&mut controller);
        Ok(controller)
    }

    pub async fn list(&self, session: &Session, query: &ListQuery) -> AppResult<ListPage> {
        let controller = self.load(session, query).await?;
        Ok(controller.page())
    }

    /// CSV del conjunto filtrado y ordenado completo
    pub async fn export(&self, session: &Session, query: &ListQuery) -> AppResult<CsvExport> {
        let controller = self.load(session, query).await?;
        if let Some(message) = controller.last_error() {
            return Err(StoreError::Backend(message.to_string()).into());
        }
        let content = controller.export_csv()?;
        let file_name = export_file_name(E::COLLECTION.slug(), Utc::now().date_naive());
        info!("📤 Exportación {} por {}", file_name, session.email);
        Ok(CsvExport { file_name, content })
    }

    pub async fn get(&self, session: &Session, id: Uuid) -> AppResult<E> {
        self.ensure_view(session)?;
        self.state.repository::<E>().get(id).await
    }

    pub async fn create(&self, session: &Session, request: E::Create) -> AppResult<ApiResponse<E>> {
        self.ensure_write(session)?;
        let entity = self.state.repository::<E>().create(request).await?;
        Ok(ApiResponse::success_with_message(
            entity,
            format!("{} created", E::COLLECTION.label()),
        ))
    }

    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        body: JsonRecord,
    ) -> AppResult<ApiResponse<E>> {
        self.ensure_write(session)?;
        let entity = self.state.repository::<E>().update(id, body).await?;
        Ok(ApiResponse::success_with_message(
            entity,
            format!("{} updated", E::COLLECTION.label()),
        ))
    }

    pub async fn delete(&self, session: &Session, id: Uuid) -> AppResult<ApiResponse<()>> {
        self.ensure_delete(session)?;
        self.state.repository::<E>().delete(id).await?;
        Ok(ApiResponse::message(format!(
            "{} deleted",
            E::COLLECTION.label()
        )))
    }
}
