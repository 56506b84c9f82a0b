//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno. Todas las variables
//! tienen un valor por defecto salvo `DATABASE_URL` con backend PostgreSQL;
//! un valor mal formado es un error de arranque, nunca se ignora.

use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::listview::DEFAULT_PAGE_SIZE;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be set")]
    Missing { key: &'static str },

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Backend de datos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub apply_schema: bool,
    pub jwt_secret: String,
    /// Duración de la sesión en segundos
    pub jwt_expiration: i64,
    pub cors_origins: Vec<String>,
    pub blob_root: String,
    /// Duración de las URLs firmadas en segundos
    pub signed_url_ttl: i64,
    pub default_page_size: usize,
    pub max_concurrent_requests: usize,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl EnvironmentConfig {
    /// Leer la configuración de las variables de entorno del proceso
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Leer la configuración con una función de búsqueda arbitraria
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let store_backend = match get("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "STORE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let database_url = get("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing { key: "DATABASE_URL" });
        }

        let default_page_size: usize = parse_or(&get, "DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;

        Ok(Self {
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            port: parse_or(&get, "PORT", 3000)?,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            store_backend,
            database_url,
            apply_schema: parse_or(&get, "APPLY_SCHEMA", false)?,
            jwt_secret: get("JWT_SECRET")
                .unwrap_or_else(|| "change-me-in-production".to_string()),
            jwt_expiration: parse_or(&get, "JWT_EXPIRATION", 8 * 3600)?,
            cors_origins: get("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            blob_root: get("BLOB_ROOT").unwrap_or_else(|| "./data/blobs".to_string()),
            signed_url_ttl: parse_or(&get, "SIGNED_URL_TTL", 3600)?,
            default_page_size: default_page_size.max(1),
            max_concurrent_requests: parse_or(&get, "MAX_CONCURRENT_REQUESTS", 256)?,
            admin_email: get("ADMIN_EMAIL"),
            admin_password: get("ADMIN_PASSWORD"),
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
