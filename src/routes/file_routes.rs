use axum::{
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::state::AppState;
use crate::utils::errors::AppError;

/// Descarga pública: la autorización va dentro del token firmado
pub fn create_file_router() -> Router<AppState> {
    Router::new().route("/files/:token", get(download))
}

async fn download(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, AppError> {
    let content = state.blobs.open_signed(&token).await?;
    let disposition = format!(
        "inline; filename*=UTF-8''{}",
        urlencoding::encode(content.file_name())
    );

    let mut response = content.bytes.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}
