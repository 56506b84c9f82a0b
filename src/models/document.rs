//! Modelo de Document
//!
//! Metadatos de ficheros guardados en el almacén de blobs. El contenido se
//! sirve siempre mediante URLs firmadas de duración limitada.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::collection::Collection;
use super::entity::Entity;
use super::expiry::{days_until, today, ExpiryStatus};
use super::links::{vehicle_join, vehicle_label, LinkedVehicle};
use crate::impl_record;
use crate::listview::{ColumnSpec, EntityListConfig, SummarySpec};
use crate::repositories::collection_client::Join;
use crate::utils::validation::validate_not_blank;

/// Document - mapea a la tabla documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub document_type: String,
    pub vehicle_id: Option<Uuid>,
    pub file_path: String,
    pub file_name: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub vehicle: Option<LinkedVehicle>,
}

impl Document {
    /// Sin fecha de vencimiento no hay estado
    pub fn expiry_status_on(&self, today: NaiveDate) -> Option<ExpiryStatus> {
        self.expiry_date
            .map(|expiry| ExpiryStatus::from_days(days_until(expiry, today)))
    }

    pub fn expiry_status(&self) -> Option<ExpiryStatus> {
        self.expiry_status_on(today())
    }
}

impl_record!(Document {
    id,
    title,
    document_type,
    vehicle_id,
    file_name,
    expiry_date,
    created_at,
} computed {
    vehicle_label => |d: &Document| vehicle_label(&d.vehicle),
    expiry_status => |d: &Document| d.expiry_status().map(|s| s.as_str().to_string()),
});

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateDocumentRequest {
    #[validate(required, length(min = 1, max = 200), custom = "validate_not_blank")]
    pub title: Option<String>,

    #[validate(required, length(min = 2, max = 50))]
    pub document_type: Option<String>,

    pub vehicle_id: Option<Uuid>,

    /// Ruta del blob; solo la fija la subida de documentos, nunca el cliente
    #[serde(skip_deserializing)]
    #[validate(required, length(min = 1, max = 500))]
    pub file_path: Option<String>,

    #[validate(length(max = 255))]
    pub file_name: Option<String>,

    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateDocumentRequest {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub title: Option<String>,

    #[validate(length(min = 2, max = 50))]
    pub document_type: Option<String>,

    pub vehicle_id: Option<Uuid>,
    pub expiry_date: Option<NaiveDate>,
}

impl Entity for Document {
    const COLLECTION: Collection = Collection::Documents;
    type Create = CreateDocumentRequest;
    type Update = UpdateDocumentRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn joins() -> Vec<Join> {
        vec![vehicle_join()]
    }

    fn list_config() -> EntityListConfig<Self> {
        EntityListConfig::new("created_at")
            .sorted_descending()
            .searchable(&["title", "document_type", "file_name", "vehicle_label"])
            .filters(&["document_type", "vehicle_id", "expiry_status"])
            .columns(vec![
                ColumnSpec::new("title", "Title"),
                ColumnSpec::new("document_type", "Type"),
                ColumnSpec::new("vehicle_label", "Vehicle"),
                ColumnSpec::new("file_name", "File"),
                ColumnSpec::new("expiry_date", "Expires"),
                ColumnSpec::new("expiry_status", "Status"),
            ])
            .summary(
                SummarySpec::new()
                    .count("total_documents")
                    .count_where("expired", |d: &Document| {
                        d.expiry_status() == Some(ExpiryStatus::Expired)
                    })
                    .count_where("expiring_soon", |d: &Document| {
                        d.expiry_status() == Some(ExpiryStatus::ExpiringSoon)
                    }),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listview::Record;
    use serde_json::json;

    #[test]
    fn test_document_without_expiry_has_no_status() {
        let document: Document = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "title": "Registration certificate",
            "document_type": "registration",
            "file_path": "vehicles/abc/cert.pdf",
        }))
        .unwrap();
        assert_eq!(document.expiry_status(), None);
        assert!(document.field("expiry_status").is_null());
        assert!(!document.field_names().contains(&"file_path".to_string()));
    }

    #[test]
    fn test_create_requires_file_path() {
        let request: CreateDocumentRequest = serde_json::from_value(json!({
            "title": "Insurance",
            "document_type": "insurance",
        }))
        .unwrap();
        assert!(request.validate().unwrap_err().field_errors().contains_key("file_path"));
    }

    #[test]
    fn test_client_cannot_choose_file_path() {
        let request: CreateDocumentRequest = serde_json::from_value(json!({
            "title": "Insurance",
            "document_type": "insurance",
            "file_path": "vehicles/other/secret.pdf",
        }))
        .unwrap();
        assert_eq!(request.file_path, None);
        assert!(request.validate().unwrap_err().field_errors().contains_key("file_path"));
    }
}
