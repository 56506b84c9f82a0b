use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

use municipal_fleet::config::{EnvironmentConfig, StoreBackend};
use municipal_fleet::database::{apply_schema, create_pool};
use municipal_fleet::models::Collection;
use municipal_fleet::repositories::{CollectionClient, InMemoryCollectionClient, PgCollectionClient};
use municipal_fleet::routes::create_app_router;
use municipal_fleet::services::auth_service::ensure_admin;
use municipal_fleet::services::JwtService;
use municipal_fleet::state::AppState;
use municipal_fleet::storage::LocalBlobStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    let level = if config.is_development() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("🚛 Municipal Fleet - API de gestión de flota");
    info!("================================================");
    info!("🌍 Entorno: {}", config.environment);

    // Inicializar backend de datos
    let store: Arc<dyn CollectionClient> = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
            let pool = match create_pool(database_url).await {
                Ok(pool) => pool,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {:#}", e);
                    return Err(e);
                }
            };
            if config.apply_schema {
                apply_schema(&pool).await?;
            }
            info!("✅ PostgreSQL conectado exitosamente");
            Arc::new(PgCollectionClient::new(pool))
        }
        StoreBackend::Memory => {
            warn!("⚠️ Backend en memoria: los datos se pierden al reiniciar");
            Arc::new(InMemoryCollectionClient::new())
        }
    };

    let jwt = JwtService::new(&config.jwt_secret, config.jwt_expiration);
    let blobs = Arc::new(LocalBlobStore::new(config.blob_root.clone(), jwt.clone()));
    info!("📁 Ficheros en {}", blobs.root().display());

    let app_state = AppState::new(store, blobs, jwt, config.clone());

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        match ensure_admin(&app_state, email, password).await {
            Ok(true) => {}
            Ok(false) => info!("👤 Ya existen usuarios, no se crea el administrador inicial"),
            Err(e) => warn!("⚠️ No se pudo crear el administrador inicial: {}", e),
        }
    }

    let app = create_app_router(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🌐 Servidor iniciando en {}", config.server_url());
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Estado del servicio");
    info!("   POST /api/auth/login - Iniciar sesión");
    info!("   GET  /api/auth/me - Usuario actual y navegación");
    info!("   GET  /api/dashboard - Resúmenes por colección");
    info!("   GET  /api/navigation - Entradas de navegación por rol");
    for collection in Collection::ALL {
        let base = format!("/api/{}", collection.slug());
        info!("📋 {}:", collection.label());
        info!("   GET  {} - Listar (search, sort, direction, page, page_size, filtros)", base);
        info!("   GET  {}/export - Exportar CSV", base);
        info!("   POST {} - Crear", base);
        info!("   GET|PUT|DELETE {}/:id", base);
    }
    info!("   POST /api/documents/upload - Subir documento");
    info!("   GET  /api/documents/:id/url - URL firmada del documento");
    info!("   POST|GET /api/vehicles/:id/image - Imagen del vehículo");
    info!("   GET  /files/:token - Descarga firmada");

    // Iniciar servidor en background
    let server_handle = tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                error!("❌ Error del servidor: {}", e);
                e
            })
    });

    // Esperar a que el servidor termine
    if let Err(e) = server_handle.await? {
        error!("❌ Servidor terminó con error: {}", e);
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
