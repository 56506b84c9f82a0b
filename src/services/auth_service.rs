//! Servicio de autenticación
//!
//! Login con email y contraseña (bcrypt) contra la colección de usuarios y
//! emisión del token de sesión.

use tracing::{info, warn};
use validator::Validate;

use crate::dto::{LoginRequest, LoginResponse};
use crate::models::user::CreateUserRequest;
use crate::models::{Role, User};
use crate::services::jwt_service::Session;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

const INVALID_CREDENTIALS: &str = "Email o contraseña incorrectos";

/// Busca un usuario por email sin distinguir mayúsculas
pub async fn find_user_by_email(state: &AppState, email: &str) -> AppResult<Option<User>> {
    let email = email.trim().to_lowercase();
    let users = state.repository::<User>().list().await?;
    Ok(users
        .into_iter()
        .find(|user| user.email.to_lowercase() == email))
}

pub async fn login(state: &AppState, request: LoginRequest) -> AppResult<LoginResponse> {
    request.validate()?;

    let Some(user) = find_user_by_email(state, &request.email).await? else {
        warn!("🔒 Login fallido para {}", request.email);
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    let valid = bcrypt::verify(&request.password, &user.password_hash).unwrap_or(false);
    if !valid {
        warn!("🔒 Contraseña incorrecta para {}", user.email);
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let token = state.jwt.issue_session(&user)?;
    info!("🔓 Login correcto: {} ({})", user.email, user.role.as_str());

    Ok(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in: state.jwt.session_duration_secs(),
        user,
    })
}

/// Usuario actual de la sesión
pub async fn current_user(state: &AppState, session: &Session) -> AppResult<User> {
    state.repository::<User>().get(session.user_id).await
}

/// Crea el administrador inicial si la colección de usuarios está vacía
pub async fn ensure_admin(state: &AppState, email: &str, password: &str) -> AppResult<bool> {
    let repository = state.repository::<User>();
    if !repository.list().await?.is_empty() {
        return Ok(false);
    }

    let request = CreateUserRequest {
        email: Some(email.to_string()),
        full_name: Some("Administrator".to_string()),
        role: Role::Admin,
        password: Some(password.to_string()),
    };
    let admin = repository.create(request).await?;
    info!("👤 Administrador inicial creado: {}", admin.email);
    Ok(true)
}
