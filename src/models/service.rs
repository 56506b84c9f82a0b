//! Modelo de Service (mantenimiento de vehículos)

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::collection::Collection;
use super::entity::Entity;
use super::links::{vehicle_join, vehicle_label, LinkedVehicle};
use super::role::Role;
use crate::impl_record;
use crate::listview::{ColumnSpec, EntityListConfig, SummarySpec};
use crate::repositories::collection_client::Join;
use crate::utils::validation::{validate_amount, validate_date_order, validate_service_status};

/// Service - mapea a la tabla services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub service_type: String,
    pub service_date: NaiveDate,
    pub description: Option<String>,
    pub provider: Option<String>,
    pub cost: Option<Decimal>,
    pub odometer_km: Option<i32>,
    pub status: String,
    pub next_service_date: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub vehicle: Option<LinkedVehicle>,
}

impl Service {
    pub fn vehicle_label(&self) -> String {
        vehicle_label(&self.vehicle)
    }
}

impl_record!(Service {
    id,
    vehicle_id,
    service_type,
    service_date,
    description,
    provider,
    cost,
    odometer_km,
    status,
    next_service_date,
    created_at,
} computed {
    vehicle_label => |s: &Service| s.vehicle_label(),
});

fn default_status() -> String {
    "scheduled".to_string()
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_service_dates", skip_on_field_errors = false))]
pub struct CreateServiceRequest {
    #[validate(required)]
    pub vehicle_id: Option<Uuid>,

    #[validate(required, length(min = 2, max = 100))]
    pub service_type: Option<String>,

    #[validate(required)]
    pub service_date: Option<NaiveDate>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(length(max = 150))]
    pub provider: Option<String>,

    #[validate(custom = "validate_amount")]
    pub cost: Option<Decimal>,

    #[validate(range(min = 0))]
    pub odometer_km: Option<i32>,

    #[serde(default = "default_status")]
    #[validate(custom = "validate_service_status")]
    pub status: String,

    pub next_service_date: Option<NaiveDate>,
}

fn validate_service_dates(request: &CreateServiceRequest) -> Result<(), ValidationError> {
    match request.next_service_date {
        Some(next) => validate_date_order(request.service_date, next),
        None => Ok(()),
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateServiceRequest {
    pub vehicle_id: Option<Uuid>,

    #[validate(length(min = 2, max = 100))]
    pub service_type: Option<String>,

    pub service_date: Option<NaiveDate>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(length(max = 150))]
    pub provider: Option<String>,

    #[validate(custom = "validate_amount")]
    pub cost: Option<Decimal>,

    #[validate(range(min = 0))]
    pub odometer_km: Option<i32>,

    #[validate(custom = "validate_service_status")]
    pub status: Option<String>,

    pub next_service_date: Option<NaiveDate>,
}

impl Entity for Service {
    const COLLECTION: Collection = Collection::Services;
    type Create = CreateServiceRequest;
    type Update = UpdateServiceRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn joins() -> Vec<Join> {
        vec![vehicle_join()]
    }

    fn list_config() -> EntityListConfig<Self> {
        EntityListConfig::new("service_date")
            .sorted_descending()
            .searchable(&["vehicle_label", "service_type", "provider", "description"])
            .filters(&["status", "service_type", "vehicle_id"])
            .columns(vec![
                ColumnSpec::new("service_date", "Date"),
                ColumnSpec::new("vehicle_label", "Vehicle"),
                ColumnSpec::new("service_type", "Type"),
                ColumnSpec::new("provider", "Provider"),
                ColumnSpec::restricted("cost", "Cost", Role::Manager),
                ColumnSpec::new("status", "Status"),
                ColumnSpec::new("next_service_date", "Next Service"),
            ])
            .summary(
                SummarySpec::new()
                    .count("total_services")
                    .count_equals("scheduled", "status", "scheduled")
                    .count_equals("completed", "status", "completed")
                    .sum("total_cost", "cost")
                    .average("average_cost", "cost"),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listview::{FieldValue, Record};
    use crate::models::links::UNKNOWN_VEHICLE;
    use serde_json::json;

    #[test]
    fn test_dangling_vehicle_shows_placeholder() {
        let service: Service = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "vehicle_id": Uuid::new_v4(),
            "service_type": "Oil change",
            "service_date": "2024-03-01",
            "cost": 1250.5,
            "status": "completed",
            "vehicle": null,
        }))
        .unwrap();
        assert_eq!(service.field("vehicle_label"), FieldValue::Text(UNKNOWN_VEHICLE.to_string()));
        assert_eq!(service.field("cost"), FieldValue::Number(1250.5));
        assert_eq!(service.field("service_date"), FieldValue::Text("2024-03-01".to_string()));
    }

    #[test]
    fn test_next_service_before_service_date_is_rejected() {
        let request: CreateServiceRequest = serde_json::from_value(json!({
            "vehicle_id": Uuid::new_v4(),
            "service_type": "Brakes",
            "service_date": "2024-03-01",
            "next_service_date": "2024-02-01",
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_negative_cost_is_rejected() {
        let request: UpdateServiceRequest = serde_json::from_value(json!({"cost": -10})).unwrap();
        assert!(request.validate().is_err());
    }
}
