//! Modelo de Tyre

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::collection::Collection;
use super::entity::Entity;
use super::links::{vehicle_join, vehicle_label, LinkedVehicle};
use super::role::Role;
use crate::impl_record;
use crate::listview::{ColumnSpec, EntityListConfig, SummarySpec};
use crate::repositories::collection_client::Join;
use crate::utils::validation::{validate_amount, validate_tyre_status};

/// Profundidad mínima legal del dibujo
pub const MIN_TREAD_DEPTH_MM: f64 = 1.6;

/// Tyre - mapea a la tabla tyres
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tyre {
    pub id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub brand: String,
    pub size: Option<String>,
    pub position: Option<String>,
    pub serial_number: Option<String>,
    pub install_date: Option<NaiveDate>,
    pub tread_depth_mm: Option<f64>,
    pub status: String,
    pub cost: Option<Decimal>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub vehicle: Option<LinkedVehicle>,
}

impl Tyre {
    pub fn needs_replacement(&self) -> bool {
        self.status == "in_use"
            && self
                .tread_depth_mm
                .map(|depth| depth < MIN_TREAD_DEPTH_MM)
                .unwrap_or(false)
    }
}

impl_record!(Tyre {
    id,
    vehicle_id,
    brand,
    size,
    position,
    serial_number,
    install_date,
    tread_depth_mm,
    status,
    cost,
    created_at,
} computed {
    vehicle_label => |t: &Tyre| vehicle_label(&t.vehicle),
    needs_replacement => |t: &Tyre| t.needs_replacement(),
});

fn default_status() -> String {
    "in_stock".to_string()
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateTyreRequest {
    pub vehicle_id: Option<Uuid>,

    #[validate(required, length(min = 1, max = 100))]
    pub brand: Option<String>,

    #[validate(length(max = 30))]
    pub size: Option<String>,

    #[validate(length(max = 30))]
    pub position: Option<String>,

    #[validate(length(max = 50))]
    pub serial_number: Option<String>,

    pub install_date: Option<NaiveDate>,

    #[validate(range(min = 0.0, max = 30.0))]
    pub tread_depth_mm: Option<f64>,

    #[serde(default = "default_status")]
    #[validate(custom = "validate_tyre_status")]
    pub status: String,

    #[validate(custom = "validate_amount")]
    pub cost: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateTyreRequest {
    pub vehicle_id: Option<Uuid>,

    #[validate(length(min = 1, max = 100))]
    pub brand: Option<String>,

    #[validate(length(max = 30))]
    pub size: Option<String>,

    #[validate(length(max = 30))]
    pub position: Option<String>,

    #[validate(length(max = 50))]
    pub serial_number: Option<String>,

    pub install_date: Option<NaiveDate>,

    #[validate(range(min = 0.0, max = 30.0))]
    pub tread_depth_mm: Option<f64>,

    #[validate(custom = "validate_tyre_status")]
    pub status: Option<String>,

    #[validate(custom = "validate_amount")]
    pub cost: Option<Decimal>,
}

impl Entity for Tyre {
    const COLLECTION: Collection = Collection::Tyres;
    type Create = CreateTyreRequest;
    type Update = UpdateTyreRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn joins() -> Vec<Join> {
        vec![vehicle_join()]
    }

    fn list_config() -> EntityListConfig<Self> {
        EntityListConfig::new("brand")
            .searchable(&["brand", "size", "serial_number", "vehicle_label"])
            .filters(&["status", "position", "brand", "vehicle_id"])
            .columns(vec![
                ColumnSpec::new("brand", "Brand"),
                ColumnSpec::new("size", "Size"),
                ColumnSpec::new("vehicle_label", "Vehicle"),
                ColumnSpec::new("position", "Position"),
                ColumnSpec::new("tread_depth_mm", "Tread (mm)"),
                ColumnSpec::new("status", "Status"),
                ColumnSpec::restricted("cost", "Cost", Role::Manager),
            ])
            .summary(
                SummarySpec::new()
                    .count("total_tyres")
                    .count_equals("in_use", "status", "in_use")
                    .count_equals("in_stock", "status", "in_stock")
                    .count_where("needs_replacement", Tyre::needs_replacement)
                    .sum("total_cost", "cost"),
            )
    }
}
