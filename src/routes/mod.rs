//! Rutas de la API
//!
//! `create_app_router` monta las rutas públicas (salud, login, descargas
//! firmadas) y, detrás de `require_session`, todas las colecciones.

pub mod auth_routes;
pub mod dashboard_routes;
pub mod document_routes;
pub mod entity_routes;
pub mod file_routes;

use axum::{middleware, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::{cors_layer, require_session};
use crate::models::{
    Accident, Collection, Document, Driver, FuelLog, License, Service, Tyre, User, Vehicle,
};
use crate::state::AppState;

pub use entity_routes::entity_router;

fn api_path(collection: Collection) -> String {
    format!("/api/{}", collection.slug())
}

/// Router completo de la aplicación
pub fn create_app_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest(
            &api_path(Collection::Vehicles),
            entity_router::<Vehicle>().merge(document_routes::create_vehicle_image_router()),
        )
        .nest(&api_path(Collection::Drivers), entity_router::<Driver>())
        .nest(&api_path(Collection::Services), entity_router::<Service>())
        .nest(&api_path(Collection::Accidents), entity_router::<Accident>())
        .nest(&api_path(Collection::Tyres), entity_router::<Tyre>())
        .nest(&api_path(Collection::Licenses), entity_router::<License>())
        .nest(&api_path(Collection::FuelLogs), entity_router::<FuelLog>())
        .nest(
            &api_path(Collection::Documents),
            entity_router::<Document>().merge(document_routes::create_document_router()),
        )
        .nest(&api_path(Collection::Users), entity_router::<User>())
        .nest("/api/auth", auth_routes::create_session_router())
        .nest("/api", dashboard_routes::create_dashboard_router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let public = Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes::create_auth_router())
        .merge(file_routes::create_file_router());

    let max_concurrent = state.config.max_concurrent_requests.max(1);
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(ConcurrencyLimitLayer::new(max_concurrent))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Endpoint de salud
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
