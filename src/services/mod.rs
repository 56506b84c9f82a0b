//! Servicios de negocio
//!
//! Autenticación, navegación por rol, dashboard y documentos.

pub mod auth_service;
pub mod dashboard_service;
pub mod document_service;
pub mod jwt_service;
pub mod navigation_service;

pub use jwt_service::{JwtService, Session};
