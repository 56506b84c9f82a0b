//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle, sus formularios de alta y edición
//! y la configuración de su listado.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::collection::Collection;
use super::entity::Entity;
use super::role::Role;
use crate::impl_record;
use crate::listview::{ColumnSpec, EntityListConfig, SummarySpec};
use crate::utils::validation::validate_vehicle_status;

/// Vehicle - mapea a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub registration_number: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub vin: Option<String>,
    pub fuel_type: Option<String>,
    pub status: String,
    pub department: Option<String>,
    pub odometer_km: Option<i32>,
    pub image_path: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Vehicle {
    pub fn status_badge(&self) -> &'static str {
        match self.status.as_str() {
            "active" => "Active",
            "maintenance" => "In Maintenance",
            "out_of_service" => "Out of Service",
            "retired" => "Retired",
            _ => "Unknown",
        }
    }
}

impl_record!(Vehicle {
    id,
    registration_number,
    make,
    model,
    year,
    vin,
    fuel_type,
    status,
    department,
    odometer_km,
    created_at,
} computed {
    status_badge => |v: &Vehicle| v.status_badge(),
});

fn default_status() -> String {
    "active".to_string()
}

/// Request para crear un nuevo vehículo
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(required, regex = "crate::utils::validation::RE_REGISTRATION")]
    pub registration_number: Option<String>,

    #[validate(required, length(min = 1, max = 100))]
    pub make: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    #[validate(range(min = 1950, max = 2100))]
    pub year: Option<i32>,

    #[validate(regex = "crate::utils::validation::RE_VIN")]
    pub vin: Option<String>,

    #[validate(length(min = 2, max = 20))]
    pub fuel_type: Option<String>,

    #[serde(default = "default_status")]
    #[validate(custom = "validate_vehicle_status")]
    pub status: String,

    pub department: Option<String>,

    #[validate(range(min = 0))]
    pub odometer_km: Option<i32>,
}

/// Request para actualizar un vehículo existente
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(regex = "crate::utils::validation::RE_REGISTRATION")]
    pub registration_number: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub make: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    #[validate(range(min = 1950, max = 2100))]
    pub year: Option<i32>,

    #[validate(regex = "crate::utils::validation::RE_VIN")]
    pub vin: Option<String>,

    #[validate(length(min = 2, max = 20))]
    pub fuel_type: Option<String>,

    #[validate(custom = "validate_vehicle_status")]
    pub status: Option<String>,

    pub department: Option<String>,

    #[validate(range(min = 0))]
    pub odometer_km: Option<i32>,
}

impl Entity for Vehicle {
    const COLLECTION: Collection = Collection::Vehicles;
    type Create = CreateVehicleRequest;
    type Update = UpdateVehicleRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn list_config() -> EntityListConfig<Self> {
        EntityListConfig::new("registration_number")
            .searchable(&["registration_number", "make", "model", "vin"])
            .filters(&["status", "fuel_type", "department"])
            .columns(vec![
                ColumnSpec::new("registration_number", "Registration"),
                ColumnSpec::new("make", "Make"),
                ColumnSpec::new("model", "Model"),
                ColumnSpec::new("year", "Year"),
                ColumnSpec::new("status_badge", "Status"),
                ColumnSpec::new("department", "Department"),
                ColumnSpec::restricted("vin", "VIN", Role::Manager),
                ColumnSpec::new("odometer_km", "Odometer (km)"),
            ])
            .summary(
                SummarySpec::new()
                    .count("total_vehicles")
                    .count_equals("active", "status", "active")
                    .count_equals("in_maintenance", "status", "maintenance")
                    .count_equals("out_of_service", "status", "out_of_service"),
            )
    }
}
