//! Referencias a vehículos y conductores resueltas por join
//!
//! Una clave foránea nula o que apunta a un registro borrado no es un
//! error: se muestra una etiqueta sustituta.

use serde::{Deserialize, Serialize};

use super::collection::Collection;
use crate::repositories::collection_client::Join;

pub const UNKNOWN_VEHICLE: &str = "Unknown Vehicle";
pub const UNKNOWN_DRIVER: &str = "Unknown Driver";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedVehicle {
    pub registration_number: String,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedDriver {
    pub full_name: String,
}

pub fn vehicle_join() -> Join {
    Join {
        collection: Collection::Vehicles,
        foreign_key: "vehicle_id",
        alias: "vehicle",
        fields: &["registration_number", "make", "model"],
    }
}

pub fn driver_join() -> Join {
    Join {
        collection: Collection::Drivers,
        foreign_key: "driver_id",
        alias: "driver",
        fields: &["full_name"],
    }
}

/// "CA 123 (Ford Ranger)" o la etiqueta sustituta
pub fn vehicle_label(vehicle: &Option<LinkedVehicle>) -> String {
    match vehicle {
        Some(v) => {
            let description = [v.make.as_deref(), v.model.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            if description.is_empty() {
                v.registration_number.clone()
            } else {
                format!("{} ({})", v.registration_number, description)
            }
        }
        None => UNKNOWN_VEHICLE.to_string(),
    }
}

pub fn driver_label(driver: &Option<LinkedDriver>) -> String {
    driver
        .as_ref()
        .map(|d| d.full_name.clone())
        .unwrap_or_else(|| UNKNOWN_DRIVER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let vehicle = Some(LinkedVehicle {
            registration_number: "CA 1".to_string(),
            make: Some("Ford".to_string()),
            model: Some("Ranger".to_string()),
        });
        assert_eq!(vehicle_label(&vehicle), "CA 1 (Ford Ranger)");
        assert_eq!(vehicle_label(&None), UNKNOWN_VEHICLE);
        assert_eq!(driver_label(&None), UNKNOWN_DRIVER);
    }
}
