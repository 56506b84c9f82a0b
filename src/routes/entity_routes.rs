//! Rutas genéricas de colección
//!
//! `entity_router::<E>()` monta listado, exportación y CRUD de una entidad.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::{CsvExport, EntityController};
use crate::dto::{ApiResponse, ListQuery};
use crate::listview::ListPage;
use crate::models::Entity;
use crate::repositories::collection_client::JsonRecord;
use crate::services::jwt_service::Session;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn entity_router<E: Entity>() -> Router<AppState> {
    Router::new()
        .route("/", get(list_entities::<E>).post(create_entity::<E>))
        .route("/export", get(export_entities::<E>))
        .route(
            "/:id",
            get(get_entity::<E>)
                .put(update_entity::<E>)
                .delete(delete_entity::<E>),
        )
}

async fn list_entities<E: Entity>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<ListPage>>, AppError> {
    let query = ListQuery::from_params(params)?;
    let page = EntityController::<E>::new(state).list(&session, &query).await?;
    Ok(Json(ApiResponse::success(page)))
}

async fn export_entities<E: Entity>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let query = ListQuery::from_params(params)?;
    let export = EntityController::<E>::new(state).export(&session, &query).await?;
    Ok(csv_response(export))
}

/// Respuesta `text/csv` como descarga
pub fn csv_response(export: CsvExport) -> Response {
    let disposition = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        export.file_name,
        urlencoding::encode(&export.file_name)
    );
    let mut response = export.content.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

async fn get_entity<E: Entity>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<E>>, AppError> {
    let entity = EntityController::<E>::new(state).get(&session, id).await?;
    Ok(Json(ApiResponse::success(entity)))
}

async fn create_entity<E: Entity>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(request): Json<E::Create>,
) -> Result<(StatusCode, Json<ApiResponse<E>>), AppError> {
    let response = EntityController::<E>::new(state)
        .create(&session, request)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_entity<E: Entity>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(body): Json<JsonRecord>,
) -> Result<Json<ApiResponse<E>>, AppError> {
    let response = EntityController::<E>::new(state)
        .update(&session, id, body)
        .await?;
    Ok(Json(response))
}

async fn delete_entity<E: Entity>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let response = EntityController::<E>::new(state).delete(&session, id).await?;
    Ok(Json(response))
}
