//! Modelo de User
//!
//! Cuentas de acceso a la aplicación. El hash de la contraseña se lee del
//! backend para el login pero nunca se serializa hacia el cliente.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::collection::Collection;
use super::entity::{only_provided, to_json_record, without_nulls, Entity};
use super::role::Role;
use crate::impl_record;
use crate::listview::{ColumnSpec, EntityListConfig, SummarySpec};
use crate::repositories::collection_client::JsonRecord;
use crate::utils::errors::{AppError, AppResult};

/// User - mapea a la tabla users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(default, skip_serializing)]
    pub password_hash: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl_record!(User {
    id,
    email,
    full_name,
    role,
    created_at,
});

/// Request para crear un nuevo usuario
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(required, email)]
    pub email: Option<String>,

    #[validate(required, length(min = 2, max = 100))]
    pub full_name: Option<String>,

    #[serde(default)]
    pub role: Role,

    #[validate(required, length(min = 8, max = 100))]
    pub password: Option<String>,
}

/// Request para actualizar un usuario existente
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 2, max = 100))]
    pub full_name: Option<String>,

    pub role: Option<Role>,

    #[validate(length(min = 8, max = 100))]
    pub password: Option<String>,
}

/// Hash bcrypt de una contraseña
pub fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Hash(format!("Error hashing password: {}", e)))
}

/// Sustituye `password` por `password_hash` en el registro a guardar
fn with_hashed_password(mut record: JsonRecord) -> AppResult<JsonRecord> {
    if let Some(password) = record.remove("password") {
        let password = password
            .as_str()
            .ok_or_else(|| AppError::BadRequest("password must be a string".to_string()))?;
        record.insert(
            "password_hash".to_string(),
            serde_json::Value::String(hash_password(password)?),
        );
    }
    Ok(record)
}

impl Entity for User {
    const COLLECTION: Collection = Collection::Users;
    type Create = CreateUserRequest;
    type Update = UpdateUserRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn insert_record(create: Self::Create) -> AppResult<JsonRecord> {
        with_hashed_password(without_nulls(to_json_record(&create)?)?)
    }

    fn update_patch(update: Self::Update, provided: &JsonRecord) -> AppResult<JsonRecord> {
        with_hashed_password(only_provided(to_json_record(&update)?, provided))
    }

    fn list_config() -> EntityListConfig<Self> {
        EntityListConfig::new("email")
            .searchable(&["email", "full_name"])
            .filters(&["role"])
            .columns(vec![
                ColumnSpec::new("email", "Email"),
                ColumnSpec::new("full_name", "Name"),
                ColumnSpec::new("role", "Role"),
                ColumnSpec::new("created_at", "Created"),
            ])
            .summary(
                SummarySpec::new()
                    .count("total_users")
                    .count_equals("admins", "role", "admin")
                    .count_equals("managers", "role", "manager"),
            )
    }
}
