//! Navegación visible por rol
//!
//! El cliente sólo necesita el rol para decidir qué entradas de menú
//! mostrar; esta tabla es la única fuente de esa decisión.

use serde::Serialize;

use crate::models::{Collection, Role};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavEntry {
    pub key: &'static str,
    pub label: &'static str,
    pub path: String,
    pub can_write: bool,
    pub can_delete: bool,
}

/// Entradas de menú para `role`, con el dashboard siempre primero
pub fn navigation_for(role: Role) -> Vec<NavEntry> {
    let dashboard = NavEntry {
        key: "dashboard",
        label: "Dashboard",
        path: "/dashboard".to_string(),
        can_write: false,
        can_delete: false,
    };

    std::iter::once(dashboard)
        .chain(
            Collection::ALL
                .iter()
                .filter(|collection| role.can_view(**collection))
                .map(|collection| NavEntry {
                    key: collection.table_name(),
                    label: collection.label(),
                    path: format!("/{}", collection.slug()),
                    can_write: role.can_write(*collection),
                    can_delete: role.can_delete(*collection),
                }),
        )
        .collect()
}
