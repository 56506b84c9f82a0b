//! Almacén de blobs
//!
//! Guarda bytes bajo una clave y entrega URLs firmadas de duración
//! limitada para recuperarlos. La implementación local escribe en disco y
//! firma las URLs con el mismo `JwtService` de las sesiones.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::services::jwt_service::JwtService;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlobError {
    #[error("Invalid blob path: {0}")]
    InvalidPath(String),

    #[error("Invalid or expired download token: {0}")]
    InvalidToken(String),

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Blob I/O error: {0}")]
    Io(String),
}

pub type BlobResult<T> = Result<T, BlobError>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: i64,
}

/// Contenido recuperado a través de una URL firmada
#[derive(Debug, Clone, PartialEq)]
pub struct BlobContent {
    pub path: String,
    pub bytes: Vec<u8>,
}

impl BlobContent {
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> BlobResult<()>;

    async fn signed_url(&self, path: &str, ttl_seconds: i64) -> BlobResult<SignedUrl>;

    /// Resuelve un token de descarga y lee el blob
    async fn open_signed(&self, token: &str) -> BlobResult<BlobContent>;
}

/// Rechaza rutas absolutas, vacías o que salgan de la raíz
pub fn sanitize_path(path: &str) -> BlobResult<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(BlobError::InvalidPath("empty path".to_string()));
    }
    let candidate = Path::new(trimmed);
    let mut clean = PathBuf::new();
    for component in candidate.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return Err(BlobError::InvalidPath(path.to_string())),
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(BlobError::InvalidPath(path.to_string()));
    }
    Ok(clean)
}

#[derive(Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    signer: JwtService,
    public_prefix: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, signer: JwtService) -> Self {
        Self {
            root: root.into(),
            signer,
            public_prefix: "/files".to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> BlobResult<PathBuf> {
        Ok(self.root.join(sanitize_path(path)?))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> BlobResult<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BlobError::Io(e.to_string()))?;
        }
        let size = bytes.len();
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| BlobError::Io(e.to_string()))?;
        info!("📦 Blob guardado: {} ({} bytes)", path, size);
        Ok(())
    }

    async fn signed_url(&self, path: &str, ttl_seconds: i64) -> BlobResult<SignedUrl> {
        let target = self.resolve(path)?;
        if !tokio::fs::try_exists(&target).await.unwrap_or(false) {
            return Err(BlobError::NotFound(path.to_string()));
        }
        let (token, expires_at) = self
            .signer
            .issue_file_token(path, ttl_seconds)
            .map_err(|e| BlobError::InvalidToken(e.to_string()))?;
        debug!("🔏 URL firmada para {} ({}s)", path, ttl_seconds);
        Ok(SignedUrl {
            url: format!("{}/{}", self.public_prefix, token),
            expires_at,
        })
    }

    async fn open_signed(&self, token: &str) -> BlobResult<BlobContent> {
        let path = self
            .signer
            .validate_file_token(token)
            .map_err(|e| BlobError::InvalidToken(e.to_string()))?;
        let target = self.resolve(&path)?;
        match tokio::fs::read(&target).await {
            Ok(bytes) => Ok(BlobContent { path, bytes }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BlobError::NotFound(path)),
            Err(e) => Err(BlobError::Io(e.to_string())),
        }
    }
}
