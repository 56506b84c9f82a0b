//! Modelo de Accident

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::collection::Collection;
use super::entity::Entity;
use super::links::{driver_join, driver_label, vehicle_join, vehicle_label, LinkedDriver, LinkedVehicle};
use super::role::Role;
use crate::impl_record;
use crate::listview::{ColumnSpec, EntityListConfig, SummarySpec};
use crate::repositories::collection_client::Join;
use crate::utils::validation::{validate_accident_severity, validate_accident_status, validate_amount};

/// Accident - mapea a la tabla accidents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Accident {
    pub id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub accident_date: NaiveDate,
    pub location: Option<String>,
    pub description: Option<String>,
    pub severity: String,
    pub damage_cost: Option<Decimal>,
    pub police_report_number: Option<String>,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub vehicle: Option<LinkedVehicle>,
    #[serde(default)]
    pub driver: Option<LinkedDriver>,
}

impl_record!(Accident {
    id,
    vehicle_id,
    driver_id,
    accident_date,
    location,
    description,
    severity,
    damage_cost,
    police_report_number,
    status,
    created_at,
} computed {
    vehicle_label => |a: &Accident| vehicle_label(&a.vehicle),
    driver_label => |a: &Accident| driver_label(&a.driver),
});

fn default_status() -> String {
    "open".to_string()
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateAccidentRequest {
    #[validate(required)]
    pub vehicle_id: Option<Uuid>,

    pub driver_id: Option<Uuid>,

    #[validate(required)]
    pub accident_date: Option<NaiveDate>,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(required, custom = "validate_accident_severity")]
    pub severity: Option<String>,

    #[validate(custom = "validate_amount")]
    pub damage_cost: Option<Decimal>,

    #[validate(length(max = 50))]
    pub police_report_number: Option<String>,

    #[serde(default = "default_status")]
    #[validate(custom = "validate_accident_status")]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateAccidentRequest {
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub accident_date: Option<NaiveDate>,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(custom = "validate_accident_severity")]
    pub severity: Option<String>,

    #[validate(custom = "validate_amount")]
    pub damage_cost: Option<Decimal>,

    #[validate(length(max = 50))]
    pub police_report_number: Option<String>,

    #[validate(custom = "validate_accident_status")]
    pub status: Option<String>,
}

impl Entity for Accident {
    const COLLECTION: Collection = Collection::Accidents;
    type Create = CreateAccidentRequest;
    type Update = UpdateAccidentRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn joins() -> Vec<Join> {
        vec![vehicle_join(), driver_join()]
    }

    fn list_config() -> EntityListConfig<Self> {
        EntityListConfig::new("accident_date")
            .sorted_descending()
            .searchable(&[
                "vehicle_label",
                "driver_label",
                "location",
                "description",
                "police_report_number",
            ])
            .filters(&["severity", "status", "vehicle_id", "driver_id"])
            .columns(vec![
                ColumnSpec::new("accident_date", "Date"),
                ColumnSpec::new("vehicle_label", "Vehicle"),
                ColumnSpec::new("driver_label", "Driver"),
                ColumnSpec::new("location", "Location"),
                ColumnSpec::new("severity", "Severity"),
                ColumnSpec::restricted("damage_cost", "Damage Cost", Role::Manager),
                ColumnSpec::new("status", "Status"),
            ])
            .summary(
                SummarySpec::new()
                    .count("total_accidents")
                    .count_equals("open", "status", "open")
                    .count_equals("severe", "severity", "severe")
                    .sum("total_damage_cost", "damage_cost"),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listview::{FieldValue, Record};
    use crate::models::links::UNKNOWN_DRIVER;
    use serde_json::json;

    #[test]
    fn test_joined_labels() {
        let accident: Accident = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "vehicle_id": Uuid::new_v4(),
            "driver_id": null,
            "accident_date": "2024-02-10",
            "severity": "minor",
            "status": "open",
            "vehicle": {"registration_number": "CA 77", "make": "Toyota", "model": "Hilux"},
            "driver": null,
        }))
        .unwrap();
        assert_eq!(
            accident.field("vehicle_label"),
            FieldValue::Text("CA 77 (Toyota Hilux)".to_string())
        );
        assert_eq!(accident.field("driver_label"), FieldValue::Text(UNKNOWN_DRIVER.to_string()));
    }

    #[test]
    fn test_create_requires_severity() {
        let request: CreateAccidentRequest = serde_json::from_value(json!({
            "vehicle_id": Uuid::new_v4(),
            "accident_date": "2024-02-10",
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("severity"));
    }
}
