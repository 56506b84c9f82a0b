use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::dto::{ApiResponse, DocumentUrlResponse, UploadDocumentRequest, UploadDocumentResponse};
use crate::models::{Collection, Vehicle};
use crate::services::document_service::{self, MAX_FILE_BYTES};
use crate::services::jwt_service::Session;
use crate::state::AppState;
use crate::storage::SignedUrl;
use crate::utils::errors::{forbidden_error, AppError, AppResult};

/// El base64 ocupa ~4/3 del fichero original
const MAX_UPLOAD_BODY: usize = MAX_FILE_BYTES / 3 * 4 + 64 * 1024;

/// Rutas adicionales de /api/documents
pub fn create_document_router() -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(upload_document).layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY)),
        )
        .route("/:id/url", get(document_url))
}

/// Rutas adicionales de /api/vehicles
pub fn create_vehicle_image_router() -> Router<AppState> {
    Router::new().route(
        "/:id/image",
        post(upload_vehicle_image)
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY))
            .get(vehicle_image_url),
    )
}

fn ensure(allowed: bool, operation: &str) -> AppResult<()> {
    if allowed {
        Ok(())
    } else {
        Err(forbidden_error(operation, "insufficient role"))
    }
}

async fn upload_document(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(request): Json<UploadDocumentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UploadDocumentResponse>>), AppError> {
    ensure(session.role.can_write(Collection::Documents), "upload documents")?;
    let response = document_service::upload_document(&state, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(response, "Document uploaded")),
    ))
}

async fn document_url(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DocumentUrlResponse>>, AppError> {
    ensure(session.role.can_view(Collection::Documents), "view documents")?;
    let response = document_service::document_url(&state, id).await?;
    Ok(Json(ApiResponse::success(response)))
}

#[derive(Debug, Deserialize)]
struct VehicleImageRequest {
    file_name: String,
    content_base64: String,
}

async fn upload_vehicle_image(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(request): Json<VehicleImageRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    ensure(session.role.can_write(Collection::Vehicles), "modify vehicles")?;
    let vehicle = document_service::upload_vehicle_image(
        &state,
        id,
        &request.file_name,
        &request.content_base64,
    )
    .await?;
    Ok(Json(ApiResponse::success(vehicle)))
}

async fn vehicle_image_url(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SignedUrl>>, AppError> {
    ensure(session.role.can_view(Collection::Vehicles), "view vehicles")?;
    let signed = document_service::vehicle_image_url(&state, id).await?;
    Ok(Json(ApiResponse::success(signed)))
}
