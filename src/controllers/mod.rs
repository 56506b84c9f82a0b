//! Controladores de la API

pub mod entity_controller;

pub use entity_controller::{CsvExport, EntityController};
