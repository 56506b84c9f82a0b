use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::Document;
use crate::storage::SignedUrl;

// Subida de documento: metadatos + contenido en base64
#[derive(Debug, Deserialize, Validate)]
pub struct UploadDocumentRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 2, max = 50))]
    pub document_type: String,

    pub vehicle_id: Option<Uuid>,

    pub expiry_date: Option<NaiveDate>,

    #[validate(length(min = 1, max = 255))]
    pub file_name: String,

    #[validate(length(min = 1))]
    pub content_base64: String,
}

#[derive(Debug, Serialize)]
pub struct UploadDocumentResponse {
    pub document: Document,
    pub download: SignedUrl,
}

#[derive(Debug, Serialize)]
pub struct DocumentUrlResponse {
    pub document_id: Uuid,
    pub url: String,
    pub expires_at: i64,
}
