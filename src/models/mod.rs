//! Modelos del sistema
//!
//! Este módulo contiene las entidades de la flota municipal. Cada entidad
//! mapea a una colección del backend y declara su configuración de listado.

pub mod accident;
pub mod collection;
pub mod document;
pub mod driver;
pub mod entity;
pub mod expiry;
pub mod fuel_log;
pub mod license;
pub mod links;
pub mod role;
pub mod service;
pub mod tyre;
pub mod user;
pub mod vehicle;

pub use accident::Accident;
pub use collection::Collection;
pub use document::Document;
pub use driver::Driver;
pub use entity::Entity;
pub use fuel_log::FuelLog;
pub use license::License;
pub use role::Role;
pub use service::Service;
pub use tyre::Tyre;
pub use user::User;
pub use vehicle::Vehicle;
