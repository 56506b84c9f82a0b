//! Modelo de License
//!
//! Licencias y permisos de vehículos o conductores. Los días hasta el
//! vencimiento y su estado se calculan al leer y nunca se guardan.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::collection::Collection;
use super::entity::Entity;
use super::expiry::{days_until, today, ExpiryStatus};
use super::links::{driver_join, driver_label, vehicle_join, vehicle_label, LinkedDriver, LinkedVehicle};
use crate::impl_record;
use crate::listview::{ColumnSpec, EntityListConfig, SummarySpec};
use crate::repositories::collection_client::Join;
use crate::utils::validation::{validate_date_order, validate_not_blank};

/// License - mapea a la tabla licenses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    pub id: Uuid,
    pub license_type: String,
    pub license_number: String,
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: NaiveDate,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub vehicle: Option<LinkedVehicle>,
    #[serde(default)]
    pub driver: Option<LinkedDriver>,
}

impl License {
    pub fn days_until_expiry_on(&self, today: NaiveDate) -> i64 {
        days_until(self.expiry_date, today)
    }

    pub fn expiry_status_on(&self, today: NaiveDate) -> ExpiryStatus {
        ExpiryStatus::from_days(self.days_until_expiry_on(today))
    }

    pub fn days_until_expiry(&self) -> i64 {
        self.days_until_expiry_on(today())
    }

    pub fn expiry_status(&self) -> ExpiryStatus {
        self.expiry_status_on(today())
    }

    /// Titular: el conductor si existe, si no el vehículo
    pub fn holder_label(&self) -> String {
        if self.driver_id.is_some() {
            driver_label(&self.driver)
        } else {
            vehicle_label(&self.vehicle)
        }
    }
}

impl_record!(License {
    id,
    license_type,
    license_number,
    vehicle_id,
    driver_id,
    issue_date,
    expiry_date,
    created_at,
} computed {
    holder_label => |l: &License| l.holder_label(),
    days_until_expiry => |l: &License| l.days_until_expiry(),
    expiry_status => |l: &License| l.expiry_status().as_str(),
});

#[derive(Debug, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_license_dates", skip_on_field_errors = false))]
pub struct CreateLicenseRequest {
    #[validate(required, length(min = 2, max = 50))]
    pub license_type: Option<String>,

    #[validate(required, length(min = 1, max = 50), custom = "validate_not_blank")]
    pub license_number: Option<String>,

    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub issue_date: Option<NaiveDate>,

    #[validate(required)]
    pub expiry_date: Option<NaiveDate>,
}

fn validate_license_dates(request: &CreateLicenseRequest) -> Result<(), ValidationError> {
    if request.vehicle_id.is_none() && request.driver_id.is_none() {
        return Err(ValidationError::new("license_holder_required"));
    }
    match request.expiry_date {
        Some(expiry) => validate_date_order(request.issue_date, expiry),
        None => Ok(()),
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_license_update_dates"))]
pub struct UpdateLicenseRequest {
    #[validate(length(min = 2, max = 50))]
    pub license_type: Option<String>,

    #[validate(length(min = 1, max = 50), custom = "validate_not_blank")]
    pub license_number: Option<String>,

    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
}

fn validate_license_update_dates(request: &UpdateLicenseRequest) -> Result<(), ValidationError> {
    match request.expiry_date {
        Some(expiry) => validate_date_order(request.issue_date, expiry),
        None => Ok(()),
    }
}

impl Entity for License {
    const COLLECTION: Collection = Collection::Licenses;
    type Create = CreateLicenseRequest;
    type Update = UpdateLicenseRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn joins() -> Vec<Join> {
        vec![vehicle_join(), driver_join()]
    }

    fn list_config() -> EntityListConfig<Self> {
        EntityListConfig::new("expiry_date")
            .searchable(&["license_number", "license_type", "holder_label"])
            .filters(&["license_type", "expiry_status", "vehicle_id", "driver_id"])
            .columns(vec![
                ColumnSpec::new("license_type", "Type"),
                ColumnSpec::new("license_number", "Number"),
                ColumnSpec::new("holder_label", "Holder"),
                ColumnSpec::new("issue_date", "Issued"),
                ColumnSpec::new("expiry_date", "Expires"),
                ColumnSpec::new("days_until_expiry", "Days Left"),
                ColumnSpec::new("expiry_status", "Status"),
            ])
            .summary(
                SummarySpec::new()
                    .count("total_licenses")
                    .count_where("expired", |l: &License| {
                        l.expiry_status() == ExpiryStatus::Expired
                    })
                    .count_where("expiring_soon", |l: &License| {
                        l.expiry_status() == ExpiryStatus::ExpiringSoon
                    })
                    .count_where("valid", |l: &License| l.expiry_status() == ExpiryStatus::Valid),
            )
    }
}
