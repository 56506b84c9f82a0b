//! Middleware de autenticación JWT
//!
//! Este módulo maneja la extracción del token, su verificación y la
//! inyección de la `Session` en las extensions de la request.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::models::entity::from_json_record;
use crate::models::{Collection, User};
use crate::services::jwt_service::Session;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Token Bearer del header Authorization
pub fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware de autenticación JWT
///
/// El usuario debe seguir existiendo; el rol se toma del registro actual
/// y no del token, para que un cambio de rol aplique sin volver a entrar.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    let session = state
        .jwt
        .validate_session(token)
        .map_err(|_| AppError::Unauthorized("Token inválido o expirado".to_string()))?;

    let row = state
        .store
        .select_by_id(Collection::Users, session.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Usuario no encontrado".to_string()))?;
    let user: User = from_json_record(row)?;

    debug!("🔐 Sesión válida: {} ({})", user.email, user.role.as_str());
    request.extensions_mut().insert(Session {
        user_id: user.id,
        email: user.email,
        role: user.role,
    });

    Ok(next.run(request).await)
}
