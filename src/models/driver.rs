//! Modelo de Driver

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::collection::Collection;
use super::entity::Entity;
use super::role::Role;
use crate::impl_record;
use crate::listview::{ColumnSpec, EntityListConfig, SummarySpec};
use crate::utils::validation::{validate_driver_status, validate_not_blank};

/// Driver - mapea a la tabla drivers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub full_name: String,
    pub employee_number: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl_record!(Driver {
    id,
    full_name,
    employee_number,
    phone,
    email,
    department,
    status,
    created_at,
});

fn default_status() -> String {
    "active".to_string()
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate(required, length(min = 2, max = 150), custom = "validate_not_blank")]
    pub full_name: Option<String>,

    #[validate(length(min = 1, max = 30))]
    pub employee_number: Option<String>,

    #[validate(length(min = 6, max = 30))]
    pub phone: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    pub department: Option<String>,

    #[serde(default = "default_status")]
    #[validate(custom = "validate_driver_status")]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateDriverRequest {
    #[validate(length(min = 2, max = 150), custom = "validate_not_blank")]
    pub full_name: Option<String>,

    #[validate(length(min = 1, max = 30))]
    pub employee_number: Option<String>,

    #[validate(length(min = 6, max = 30))]
    pub phone: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    pub department: Option<String>,

    #[validate(custom = "validate_driver_status")]
    pub status: Option<String>,
}

impl Entity for Driver {
    const COLLECTION: Collection = Collection::Drivers;
    type Create = CreateDriverRequest;
    type Update = UpdateDriverRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn list_config() -> EntityListConfig<Self> {
        EntityListConfig::new("full_name")
            .searchable(&["full_name", "employee_number", "phone", "email"])
            .filters(&["status", "department"])
            .columns(vec![
                ColumnSpec::new("full_name", "Name"),
                ColumnSpec::new("employee_number", "Employee #"),
                ColumnSpec::new("department", "Department"),
                ColumnSpec::new("status", "Status"),
                ColumnSpec::restricted("phone", "Phone", Role::Manager),
                ColumnSpec::restricted("email", "Email", Role::Manager),
            ])
            .summary(
                SummarySpec::new()
                    .count("total_drivers")
                    .count_equals("active", "status", "active")
                    .count_equals("suspended", "status", "suspended"),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_name_is_rejected() {
        let request: CreateDriverRequest =
            serde_json::from_value(json!({"full_name": "    "})).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_invalid_email_is_rejected() {
        let request: UpdateDriverRequest =
            serde_json::from_value(json!({"email": "not-an-email"})).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }
}
