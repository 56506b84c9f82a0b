//! Servicio JWT
//!
//! Firma y valida dos tipos de token con la misma clave HS256: tokens de
//! sesión y tokens de descarga de ficheros (URLs firmadas). El campo `kind`
//! impide usar uno en lugar del otro.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::role::Role;
use crate::models::user::User;
use crate::utils::errors::{AppError, AppResult};

const SESSION_KIND: &str = "session";
const FILE_KIND: &str = "file";

/// Claims del token de sesión
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub kind: String,
    pub exp: i64,
    pub iat: i64,
}

/// Claims de una URL firmada
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileClaims {
    pub path: String,
    pub kind: String,
    pub exp: i64,
}

/// Sesión autenticada derivada del token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<SessionClaims> for Session {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: Role::from_str_lossy(&claims.role),
        }
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_duration: Duration,
}

impl JwtService {
    pub fn new(secret: &str, session_duration_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            session_duration: Duration::seconds(session_duration_secs),
        }
    }

    pub fn session_duration_secs(&self) -> i64 {
        self.session_duration.num_seconds()
    }

    /// Genera un token de sesión para el usuario
    pub fn issue_session(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            kind: SESSION_KIND.to_string(),
            exp: (now + self.session_duration).timestamp(),
            iat: now.timestamp(),
        };
        self.sign(&claims)
    }

    /// Valida un token de sesión
    pub fn validate_session(&self, token: &str) -> AppResult<Session> {
        let claims: SessionClaims = self.verify(token)?;
        if claims.kind != SESSION_KIND {
            return Err(AppError::Jwt("Token is not a session token".to_string()));
        }
        Ok(claims.into())
    }

    /// Token de descarga para `path`, válido `ttl_seconds`
    pub fn issue_file_token(&self, path: &str, ttl_seconds: i64) -> AppResult<(String, i64)> {
        let exp = (Utc::now() + Duration::seconds(ttl_seconds)).timestamp();
        let claims = FileClaims {
            path: path.to_string(),
            kind: FILE_KIND.to_string(),
            exp,
        };
        Ok((self.sign(&claims)?, exp))
    }

    /// Ruta del blob si el token es válido y no ha expirado
    pub fn validate_file_token(&self, token: &str) -> AppResult<String> {
        let claims: FileClaims = self.verify(token)?;
        if claims.kind != FILE_KIND {
            return Err(AppError::Jwt("Token is not a file token".to_string()));
        }
        Ok(claims.path)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> AppResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Jwt(format!("Error generating token: {}", e)))
    }

    fn verify<T: for<'de> Deserialize<'de>>(&self, token: &str) -> AppResult<T> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<T>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Jwt(format!("Invalid token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            email: "fleet@city.example".to_string(),
            full_name: "Fleet Office".to_string(),
            role,
            password_hash: String::new(),
            created_at: None,
        }
    }

    #[test]
    fn test_issue_and_validate_session() {
        let jwt = JwtService::new("test-secret", 3600);
        let user = user(Role::Manager);
        let token = jwt.issue_session(&user).unwrap();

        let session = jwt.validate_session(&token).unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.role, Role::Manager);
    }

    #[test]
    fn test_expired_session_is_rejected() {
        let jwt = JwtService::new("test-secret", -60);
        let token = jwt.issue_session(&user(Role::Staff)).unwrap();
        assert!(matches!(jwt.validate_session(&token), Err(AppError::Jwt(_))));
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let jwt = JwtService::new("test-secret", 3600);
        let (file_token, _) = jwt.issue_file_token("documents/a.pdf", 60).unwrap();
        let session_token = jwt.issue_session(&user(Role::Admin)).unwrap();

        assert!(jwt.validate_session(&file_token).is_err());
        assert!(jwt.validate_file_token(&session_token).is_err());
        assert_eq!(jwt.validate_file_token(&file_token).unwrap(), "documents/a.pdf");
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let jwt = JwtService::new("test-secret", 3600);
        let other = JwtService::new("another-secret", 3600);
        let token = jwt.issue_session(&user(Role::Staff)).unwrap();
        assert!(other.validate_session(&token).is_err());
    }
}
