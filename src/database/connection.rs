//! Configuración de conexión a PostgreSQL
//!
//! Este módulo crea el pool de conexiones y aplica el esquema inicial.

use anyhow::{Context, Result};
use sqlx::{Executor, PgPool};
use tracing::info;

use crate::config::DatabaseConfig;

/// Esquema de todas las colecciones
pub const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// Crear un pool de conexiones a la base de datos
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("🗄️ Conectando a {}", mask_database_url(database_url));
    let pool = DatabaseConfig::new(database_url)
        .create_pool()
        .await
        .context("No se pudo conectar a PostgreSQL")?;
    test_connection(&pool).await?;
    Ok(pool)
}

/// Verificar que la conexión funciona
async fn test_connection(pool: &PgPool) -> Result<()> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .context("La base de datos no responde")?;
    Ok(())
}

/// Aplicar el esquema (sentencias idempotentes)
pub async fn apply_schema(pool: &PgPool) -> Result<()> {
    pool.execute(SCHEMA)
        .await
        .context("Error aplicando el esquema")?;
    info!("✅ Esquema aplicado");
    Ok(())
}

/// Función helper para enmascarar la URL de la base de datos en logs
pub fn mask_database_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at_pos)) if at_pos > scheme_end => {
            format!("{}***:***@{}", &url[..scheme_end + 3], &url[at_pos + 1..])
        }
        _ => url.to_string(),
    }
}
