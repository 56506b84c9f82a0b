//! Servicio de documentos e imágenes de vehículos
//!
//! La subida son dos llamadas independientes: primero el blob, después la
//! fila. Si la segunda falla el blob queda huérfano; no hay compensación.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{DocumentUrlResponse, UploadDocumentRequest, UploadDocumentResponse};
use crate::models::document::CreateDocumentRequest;
use crate::models::{Collection, Document, Vehicle};
use crate::repositories::collection_client::JsonRecord;
use crate::state::AppState;
use crate::storage::SignedUrl;
use crate::utils::errors::{validation_error, AppError, AppResult};

/// Tamaño máximo de un fichero ya decodificado
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

/// Decodifica el contenido base64 y comprueba el tamaño
pub fn decode_content(content_base64: &str) -> AppResult<Vec<u8>> {
    let payload = content_base64
        .split_once(";base64,")
        .map(|(_, data)| data)
        .unwrap_or(content_base64);
    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|_| validation_error("content_base64", "content is not valid base64"))?;
    if bytes.is_empty() {
        return Err(validation_error("content_base64", "file is empty"));
    }
    if bytes.len() > MAX_FILE_BYTES {
        return Err(validation_error("content_base64", "file exceeds 10 MiB"));
    }
    Ok(bytes)
}

/// Nombre de fichero seguro para usar como parte de la clave del blob
pub fn safe_file_name(file_name: &str) -> String {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

fn document_blob_path(vehicle_id: Option<Uuid>, file_name: &str) -> String {
    let owner = vehicle_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "general".to_string());
    format!("documents/{}/{}-{}", owner, Uuid::new_v4(), safe_file_name(file_name))
}

pub async fn upload_document(
    state: &AppState,
    request: UploadDocumentRequest,
) -> AppResult<UploadDocumentResponse> {
    request.validate()?;
    let bytes = decode_content(&request.content_base64)?;
    let path = document_blob_path(request.vehicle_id, &request.file_name);

    state.blobs.upload(&path, bytes).await?;

    let create = CreateDocumentRequest {
        title: Some(request.title),
        document_type: Some(request.document_type),
        vehicle_id: request.vehicle_id,
        file_path: Some(path.clone()),
        file_name: Some(request.file_name),
        expiry_date: request.expiry_date,
    };
    let document = match state.repository::<Document>().create(create).await {
        Ok(document) => document,
        Err(e) => {
            warn!("⚠️ Blob {} guardado sin fila de documento: {}", path, e);
            return Err(e);
        }
    };

    let download = state
        .blobs
        .signed_url(&path, state.config.signed_url_ttl)
        .await?;
    info!("📄 Documento subido: {} ({})", document.title, document.id);

    Ok(UploadDocumentResponse { document, download })
}

pub async fn document_url(state: &AppState, id: Uuid) -> AppResult<DocumentUrlResponse> {
    let document = state.repository::<Document>().get(id).await?;
    let signed = state
        .blobs
        .signed_url(&document.file_path, state.config.signed_url_ttl)
        .await?;
    Ok(DocumentUrlResponse {
        document_id: document.id,
        url: signed.url,
        expires_at: signed.expires_at,
    })
}

/// Sube la foto de un vehículo y guarda su ruta en `image_path`
pub async fn upload_vehicle_image(
    state: &AppState,
    vehicle_id: Uuid,
    file_name: &str,
    content_base64: &str,
) -> AppResult<Vehicle> {
    let repository = state.repository::<Vehicle>();
    repository.get(vehicle_id).await?;

    let bytes = decode_content(content_base64)?;
    let path = format!("vehicles/{}/{}-{}", vehicle_id, Uuid::new_v4(), safe_file_name(file_name));
    state.blobs.upload(&path, bytes).await?;

    let mut patch = JsonRecord::new();
    patch.insert("image_path".to_string(), Value::String(path));
    state
        .store
        .update_by_id(Collection::Vehicles, vehicle_id, patch)
        .await?;
    info!("🖼️ Imagen actualizada para vehículo {}", vehicle_id);
    repository.get(vehicle_id).await
}

pub async fn vehicle_image_url(state: &AppState, vehicle_id: Uuid) -> AppResult<SignedUrl> {
    let vehicle = state.repository::<Vehicle>().get(vehicle_id).await?;
    let path = vehicle
        .image_path
        .ok_or_else(|| AppError::NotFound(format!("Vehicle {} has no image", vehicle_id)))?;
    Ok(state.blobs.signed_url(&path, state.config.signed_url_ttl).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_content_accepts_data_urls() {
        assert_eq!(decode_content("aGVsbG8=").unwrap(), b"hello".to_vec());
        assert_eq!(
            decode_content("data:text/plain;base64,aGVsbG8=").unwrap(),
            b"hello".to_vec()
        );
        assert!(decode_content("%%%").is_err());
        assert!(decode_content("").is_err());
    }

    #[test]
    fn test_safe_file_name() {
        assert_eq!(safe_file_name("../../etc/passwd"), "passwd");
        assert_eq!(safe_file_name("Licence disc (2024).pdf"), "Licence_disc__2024_.pdf");
        assert_eq!(safe_file_name(".."), "file");
    }
}
