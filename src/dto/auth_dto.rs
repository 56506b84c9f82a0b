use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::User;
use crate::services::navigation_service::NavEntry;

// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: User,
}

// Sesión actual con la navegación visible para su rol
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
    pub navigation: Vec<NavEntry>,
}
