use axum::{extract::State, routing::get, Extension, Json, Router};

use crate::dto::ApiResponse;
use crate::services::dashboard_service::{self, DashboardCard};
use crate::services::jwt_service::Session;
use crate::services::navigation_service::{navigation_for, NavEntry};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_dashboard_router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/navigation", get(navigation))
}

async fn dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<Vec<DashboardCard>>>, AppError> {
    let cards = dashboard_service::dashboard(&state, session.role).await?;
    Ok(Json(ApiResponse::success(cards)))
}

async fn navigation(Extension(session): Extension<Session>) -> Json<ApiResponse<Vec<NavEntry>>> {
    Json(ApiResponse::success(navigation_for(session.role)))
}
