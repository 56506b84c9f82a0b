//! Acceso genérico a campos de registros
//!
//! Todas las piezas del pipeline de listados (filtro, orden, resumen,
//! exportación) trabajan sobre este trait en lugar de conocer cada entidad.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Valor escalar de un campo
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Representación textual usada por búsqueda, orden y CSV.
    /// `Null` siempre se convierte en cadena vacía.
    pub fn to_display_string(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Text(s) => s.clone(),
        }
    }

    /// Valor numérico si el campo es un número o un texto numérico
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Value::from(*n as i64),
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Text(s) => Value::String(s.clone()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Registro con acceso a campos por nombre
pub trait Record {
    /// Valor del campo; un campo desconocido es `FieldValue::Null`
    fn field(&self, name: &str) -> FieldValue;

    /// Nombres de campo en orden de presentación (cabecera CSV)
    fn field_names(&self) -> Vec<String>;
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> FieldValue {
        (**self).field(name)
    }

    fn field_names(&self) -> Vec<String> {
        (**self).field_names()
    }
}

/// Campos del registro como objeto JSON, sin los de `hidden`
pub fn visible_record<R: Record + ?Sized>(record: &R, hidden: &[&str]) -> Map<String, Value> {
    record
        .field_names()
        .into_iter()
        .filter(|name| !hidden.contains(&name.as_str()))
        .map(|name| {
            let value = record.field(&name).to_json();
            (name, value)
        })
        .collect()
}

/// Registros dinámicos tal como llegan del backend
impl Record for Map<String, Value> {
    fn field(&self, name: &str) -> FieldValue {
        self.get(name).map(json_to_field).unwrap_or(FieldValue::Null)
    }

    fn field_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

fn json_to_field(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Bool(b) => FieldValue::Bool(*b),
        Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or(FieldValue::Null),
        Value::String(s) => FieldValue::Text(s.clone()),
        other => FieldValue::Text(other.to_string()),
    }
}

/// Conversión de los tipos de campo de las entidades a `FieldValue`
pub trait ToFieldValue {
    fn to_field_value(&self) -> FieldValue;
}

impl ToFieldValue for String {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }
}

impl ToFieldValue for &str {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text((*self).to_string())
    }
}

impl ToFieldValue for bool {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Bool(*self)
    }
}

impl ToFieldValue for i32 {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Number(f64::from(*self))
    }
}

impl ToFieldValue for i64 {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Number(*self as f64)
    }
}

impl ToFieldValue for f64 {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Number(*self)
    }
}

impl ToFieldValue for Decimal {
    fn to_field_value(&self) -> FieldValue {
        self.to_f64().map(FieldValue::Number).unwrap_or(FieldValue::Null)
    }
}

impl ToFieldValue for Uuid {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.to_string())
    }
}

impl ToFieldValue for NaiveDate {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.format("%Y-%m-%d").to_string())
    }
}

impl ToFieldValue for DateTime<Utc> {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.to_rfc3339())
    }
}

impl<T: ToFieldValue> ToFieldValue for Option<T> {
    fn to_field_value(&self) -> FieldValue {
        match self {
            Some(value) => value.to_field_value(),
            None => FieldValue::Null,
        }
    }
}

/// Implementa `Record` para un struct listando sus campos.
///
/// Los campos `computed` son valores derivados en tiempo de lectura
/// (etiquetas de joins, días hasta vencimiento) y nunca se persisten.
///
/// ```ignore
/// impl_record!(Service {
///     id, vehicle_id, service_type, cost,
/// } computed {
///     vehicle_label => |s: &Service| s.vehicle_label(),
/// });
/// ```
#[macro_export]
macro_rules! impl_record {
    ($ty:ty { $($field:ident),* $(,)? } $(computed { $($name:ident => $fun:expr),* $(,)? })?) => {
        impl $crate::listview::Record for $ty {
            fn field(&self, name: &str) -> $crate::listview::FieldValue {
                #[allow(unused_imports)]
                use $crate::listview::ToFieldValue;
                match name {
                    $( stringify!($field) => self.$field.to_field_value(), )*
                    $($( stringify!($name) => ($fun)(self).to_field_value(), )*)?
                    _ => $crate::listview::FieldValue::Null,
                }
            }

            fn field_names(&self) -> Vec<String> {
                vec![
                    $( stringify!($field).to_string(), )*
                    $($( stringify!($name).to_string(), )*)?
                ]
            }
        }
    };
}
