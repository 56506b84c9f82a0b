//! Modelo de FuelLog (repostajes)

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::collection::Collection;
use super::entity::{to_json_record, without_nulls, Entity};
use super::links::{driver_join, driver_label, vehicle_join, vehicle_label, LinkedDriver, LinkedVehicle};
use super::role::Role;
use crate::impl_record;
use crate::listview::{ColumnSpec, EntityListConfig, SummarySpec};
use crate::repositories::collection_client::{Join, JsonRecord};
use crate::utils::errors::AppResult;
use crate::utils::validation::validate_amount;

/// FuelLog - mapea a la tabla fuel_logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelLog {
    pub id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub fill_date: NaiveDate,
    pub liters: f64,
    pub price_per_liter: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub odometer_km: Option<i32>,
    pub station: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub vehicle: Option<LinkedVehicle>,
    #[serde(default)]
    pub driver: Option<LinkedDriver>,
}

impl_record!(FuelLog {
    id,
    vehicle_id,
    driver_id,
    fill_date,
    liters,
    price_per_liter,
    cost,
    odometer_km,
    station,
    created_at,
} computed {
    vehicle_label => |f: &FuelLog| vehicle_label(&f.vehicle),
    driver_label => |f: &FuelLog| driver_label(&f.driver),
});

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateFuelLogRequest {
    #[validate(required)]
    pub vehicle_id: Option<Uuid>,

    pub driver_id: Option<Uuid>,

    #[validate(required)]
    pub fill_date: Option<NaiveDate>,

    #[validate(required, range(min = 0.1, max = 2000.0))]
    pub liters: Option<f64>,

    #[validate(custom = "validate_amount")]
    pub price_per_liter: Option<Decimal>,

    #[validate(custom = "validate_amount")]
    pub cost: Option<Decimal>,

    #[validate(range(min = 0))]
    pub odometer_km: Option<i32>,

    #[validate(length(max = 150))]
    pub station: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateFuelLogRequest {
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub fill_date: Option<NaiveDate>,

    #[validate(range(min = 0.1, max = 2000.0))]
    pub liters: Option<f64>,

    #[validate(custom = "validate_amount")]
    pub price_per_liter: Option<Decimal>,

    #[validate(custom = "validate_amount")]
    pub cost: Option<Decimal>,

    #[validate(range(min = 0))]
    pub odometer_km: Option<i32>,

    #[validate(length(max = 150))]
    pub station: Option<String>,
}

impl Entity for FuelLog {
    const COLLECTION: Collection = Collection::FuelLogs;
    type Create = CreateFuelLogRequest;
    type Update = UpdateFuelLogRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn joins() -> Vec<Join> {
        vec![vehicle_join(), driver_join()]
    }

    /// Si el formulario no trae coste, se guarda litros × precio
    fn insert_record(mut create: Self::Create) -> AppResult<JsonRecord> {
        if create.cost.is_none() {
            if let (Some(liters), Some(price)) = (create.liters, create.price_per_liter) {
                create.cost = Decimal::try_from(liters)
                    .ok()
                    .map(|liters| (liters * price).round_dp(2));
            }
        }
        without_nulls(to_json_record(&create)?)
    }

    fn list_config() -> EntityListConfig<Self> {
        EntityListConfig::new("fill_date")
            .sorted_descending()
            .searchable(&["vehicle_label", "driver_label", "station"])
            .filters(&["vehicle_id", "driver_id", "station"])
            .columns(vec![
                ColumnSpec::new("fill_date", "Date"),
                ColumnSpec::new("vehicle_label", "Vehicle"),
                ColumnSpec::new("driver_label", "Driver"),
                ColumnSpec::new("liters", "Liters"),
                ColumnSpec::restricted("price_per_liter", "Price/L", Role::Manager),
                ColumnSpec::restricted("cost", "Cost", Role::Manager),
                ColumnSpec::new("station", "Station"),
            ])
            // average_price_per_liter es la media simple por repostaje;
            // weighted_price_per_liter pondera por litros
            .summary(
                SummarySpec::new()
                    .count("total_fill_ups")
                    .sum("total_cost", "cost")
                    .sum("total_liters", "liters")
                    .average("average_price_per_liter", "price_per_liter")
                    .ratio("weighted_price_per_liter", "cost", "liters"),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listview::summarize;
    use serde_json::json;

    fn fill(liters: f64, price: f64, cost: f64) -> FuelLog {
        serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "vehicle_id": Uuid::new_v4(),
            "fill_date": "2024-04-01",
            "liters": liters,
            "price_per_liter": price,
            "cost": cost,
        }))
        .unwrap()
    }

    #[test]
    fn test_fuel_summary() {
        let logs = vec![fill(10.0, 2.0, 20.0), fill(50.0, 4.0, 200.0)];
        let refs: Vec<&FuelLog> = logs.iter().collect();
        let summary = summarize(&refs, &FuelLog::list_config().summary);

        assert_eq!(summary["total_fill_ups"], 2.0);
        assert_eq!(summary["total_cost"], 220.0);
        assert_eq!(summary["total_liters"], 60.0);
        assert_eq!(summary["average_price_per_liter"], 3.0);
        assert!((summary["weighted_price_per_liter"] - 220.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_cost_is_computed_on_insert() {
        let request: CreateFuelLogRequest = serde_json::from_value(json!({
            "vehicle_id": Uuid::new_v4(),
            "fill_date": "2024-04-01",
            "liters": 40.0,
            "price_per_liter": "22.50",
        }))
        .unwrap();
        let record = FuelLog::insert_record(request).unwrap();
        assert_eq!(record["cost"], json!("900.00"));
        assert!(!record.contains_key("driver_id"));
    }
}
