use axum::{extract::State, routing::get, routing::post, Extension, Json, Router};

use crate::dto::{ApiResponse, LoginRequest, LoginResponse, MeResponse};
use crate::services::auth_service;
use crate::services::jwt_service::Session;
use crate::services::navigation_service::navigation_for;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas públicas de autenticación
pub fn create_auth_router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Rutas de autenticación que requieren sesión
pub fn create_session_router() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let response = auth_service::login(&state, request).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<MeResponse>>, AppError> {
    let user = auth_service::current_user(&state, &session).await?;
    let navigation = navigation_for(user.role);
    Ok(Json(ApiResponse::success(MeResponse { user, navigation })))
}
