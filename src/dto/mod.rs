//! DTOs de la API

pub mod api_response;
pub mod auth_dto;
pub mod document_dto;
pub mod list_dto;

pub use api_response::ApiResponse;
pub use auth_dto::*;
pub use document_dto::*;
pub use list_dto::ListQuery;
