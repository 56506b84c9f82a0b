//! Roles de usuario
//!
//! El rol decide qué entradas de navegación y qué columnas se muestran, y
//! qué operaciones de escritura se permiten.

use serde::{Deserialize, Serialize};

use super::collection::Collection;
use crate::listview::{FieldValue, ToFieldValue};

/// Ordenado de menor a mayor privilegio
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Staff,
    Manager,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    /// Un rol desconocido se trata como `Staff`
    pub fn from_str_lossy(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "manager" | "fleet_manager" => Role::Manager,
            _ => Role::Staff,
        }
    }

    pub fn can_view(&self, collection: Collection) -> bool {
        match collection {
            Collection::Users => *self == Role::Admin,
            _ => true,
        }
    }

    pub fn can_write(&self, collection: Collection) -> bool {
        match collection {
            Collection::Users => *self == Role::Admin,
            _ => true,
        }
    }

    pub fn can_delete(&self, collection: Collection) -> bool {
        match collection {
            Collection::Users => *self == Role::Admin,
            _ => *self >= Role::Manager,
        }
    }
}

impl ToFieldValue for Role {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::from_str_lossy("ADMIN"), Role::Admin);
        assert_eq!(Role::from_str_lossy("fleet_manager"), Role::Manager);
        assert_eq!(Role::from_str_lossy("driver"), Role::Staff);
    }

    #[test]
    fn test_role_permissions() {
        assert!(!Role::Manager.can_view(Collection::Users));
        assert!(Role::Admin.can_view(Collection::Users));
        assert!(Role::Staff.can_write(Collection::FuelLogs));
        assert!(!Role::Staff.can_delete(Collection::Vehicles));
        assert!(Role::Manager.can_delete(Collection::Vehicles));
    }
}
