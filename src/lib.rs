//! Backend de gestión de la flota municipal
//!
//! API REST sobre colecciones (vehículos, conductores, servicios,
//! accidentes, neumáticos, licencias, combustible, documentos y usuarios)
//! con listados filtrables, resúmenes y exportación CSV.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod listview;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;
