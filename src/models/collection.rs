//! Colecciones del backend
//!
//! Nombres de tabla, slugs de URL y columnas persistidas de cada entidad.
//! Las columnas son la lista blanca de lo que se puede escribir u ordenar.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Vehicles,
    Drivers,
    Services,
    Accidents,
    Tyres,
    Licenses,
    FuelLogs,
    Documents,
    Users,
}

const VEHICLE_COLUMNS: &[&str] = &[
    "id",
    "registration_number",
    "make",
    "model",
    "year",
    "vin",
    "fuel_type",
    "status",
    "department",
    "odometer_km",
    "image_path",
    "created_at",
];

const DRIVER_COLUMNS: &[&str] = &[
    "id",
    "full_name",
    "employee_number",
    "phone",
    "email",
    "department",
    "status",
    "created_at",
];

const SERVICE_COLUMNS: &[&str] = &[
    "id",
    "vehicle_id",
    "service_type",
    "service_date",
    "description",
    "provider",
    "cost",
    "odometer_km",
    "status",
    "next_service_date",
    "created_at",
];

const ACCIDENT_COLUMNS: &[&str] = &[
    "id",
    "vehicle_id",
    "driver_id",
    "accident_date",
    "location",
    "description",
    "severity",
    "damage_cost",
    "police_report_number",
    "status",
    "created_at",
];

const TYRE_COLUMNS: &[&str] = &[
    "id",
    "vehicle_id",
    "brand",
    "size",
    "position",
    "serial_number",
    "install_date",
    "tread_depth_mm",
    "status",
    "cost",
    "created_at",
];

const LICENSE_COLUMNS: &[&str] = &[
    "id",
    "license_type",
    "license_number",
    "vehicle_id",
    "driver_id",
    "issue_date",
    "expiry_date",
    "created_at",
];

const FUEL_LOG_COLUMNS: &[&str] = &[
    "id",
    "vehicle_id",
    "driver_id",
    "fill_date",
    "liters",
    "price_per_liter",
    "cost",
    "odometer_km",
    "station",
    "created_at",
];

const DOCUMENT_COLUMNS: &[&str] = &[
    "id",
    "title",
    "document_type",
    "vehicle_id",
    "file_path",
    "file_name",
    "expiry_date",
    "created_at",
];

const USER_COLUMNS: &[&str] = &[
    "id",
    "email",
    "full_name",
    "role",
    "password_hash",
    "created_at",
];

/// Columnas `NOT NULL` escribibles; un formulario no puede vaciarlas
const REQUIRED_COLUMNS: &[(Collection, &[&str])] = &[
    (Collection::Vehicles, &["registration_number", "status"]),
    (Collection::Drivers, &["full_name", "status"]),
    (Collection::Services, &["service_type", "service_date", "status"]),
    (Collection::Accidents, &["accident_date", "severity", "status"]),
    (Collection::Tyres, &["brand", "status"]),
    (Collection::Licenses, &["license_type", "license_number", "expiry_date"]),
    (Collection::FuelLogs, &["fill_date", "liters"]),
    (Collection::Documents, &["title", "document_type", "file_path"]),
    (Collection::Users, &["email", "full_name", "role", "password_hash"]),
];

/// Columnas gestionadas por el backend, nunca escritas desde formularios
const MANAGED_COLUMNS: &[&str] = &["id", "created_at"];

impl Collection {
    pub const ALL: [Collection; 9] = [
        Collection::Vehicles,
        Collection::Drivers,
        Collection::Services,
        Collection::Accidents,
        Collection::Tyres,
        Collection::Licenses,
        Collection::FuelLogs,
        Collection::Documents,
        Collection::Users,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            Collection::Vehicles => "vehicles",
            Collection::Drivers => "drivers",
            Collection::Services => "services",
            Collection::Accidents => "accidents",
            Collection::Tyres => "tyres",
            Collection::Licenses => "licenses",
            Collection::FuelLogs => "fuel_logs",
            Collection::Documents => "documents",
            Collection::Users => "users",
        }
    }

    /// Segmento de URL (`/api/fuel-logs`)
    pub fn slug(&self) -> &'static str {
        match self {
            Collection::FuelLogs => "fuel-logs",
            other => other.table_name(),
        }
    }

    /// Acepta tanto el slug como el nombre de tabla
    pub fn from_slug(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.slug() == value || c.table_name() == value)
    }

    /// Texto de la entrada de navegación
    pub fn label(&self) -> &'static str {
        match self {
            Collection::Vehicles => "Vehicles",
            Collection::Drivers => "Drivers",
            Collection::Services => "Services",
            Collection::Accidents => "Accidents",
            Collection::Tyres => "Tyres",
            Collection::Licenses => "Licenses",
            Collection::FuelLogs => "Fuel Logs",
            Collection::Documents => "Documents",
            Collection::Users => "Users",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Collection::Vehicles => VEHICLE_COLUMNS,
            Collection::Drivers => DRIVER_COLUMNS,
            Collection::Services => SERVICE_COLUMNS,
            Collection::Accidents => ACCIDENT_COLUMNS,
            Collection::Tyres => TYRE_COLUMNS,
            Collection::Licenses => LICENSE_COLUMNS,
            Collection::FuelLogs => FUEL_LOG_COLUMNS,
            Collection::Documents => DOCUMENT_COLUMNS,
            Collection::Users => USER_COLUMNS,
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns().contains(&column)
    }

    pub fn is_writable(&self, column: &str) -> bool {
        self.has_column(column) && !MANAGED_COLUMNS.contains(&column)
    }

    pub fn required_columns(&self) -> &'static [&'static str] {
        REQUIRED_COLUMNS
            .iter()
            .find(|(collection, _)| collection == self)
            .map(|(_, columns)| *columns)
            .unwrap_or(&[])
    }

    /// Nombre estático de la columna si no admite `NULL`
    pub fn required_column(&self, column: &str) -> Option<&'static str> {
        self.required_columns()
            .iter()
            .copied()
            .find(|required| *required == column)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_round_trip() {
        for collection in Collection::ALL {
            assert_eq!(Collection::from_slug(collection.slug()), Some(collection));
        }
        assert_eq!(Collection::from_slug("fuel_logs"), Some(Collection::FuelLogs));
        assert_eq!(Collection::from_slug("planes"), None);
    }

    #[test]
    fn test_required_columns_are_known_columns() {
        for collection in Collection::ALL {
            assert!(!collection.required_columns().is_empty());
            for column in collection.required_columns() {
                assert!(collection.is_writable(column), "{} {}", collection, column);
            }
        }
        assert_eq!(Collection::Accidents.required_column("severity"), Some("severity"));
        assert_eq!(Collection::Accidents.required_column("driver_id"), None);
    }

    #[test]
    fn test_managed_columns_are_not_writable() {
        assert!(Collection::Vehicles.is_writable("make"));
        assert!(!Collection::Vehicles.is_writable("id"));
        assert!(!Collection::Vehicles.is_writable("created_at"));
        assert!(!Collection::Vehicles.is_writable("drop table"));
    }
}
