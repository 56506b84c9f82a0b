//! Vencimientos de licencias y documentos
//!
//! Valores derivados en tiempo de lectura a partir de la fecha guardada.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

/// Días de antelación con que un vencimiento pasa a "expiring_soon"
pub const EXPIRY_WARNING_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Expired,
    ExpiringSoon,
    Valid,
}

impl ExpiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpiryStatus::Expired => "expired",
            ExpiryStatus::ExpiringSoon => "expiring_soon",
            ExpiryStatus::Valid => "valid",
        }
    }

    pub fn from_days(days: i64) -> Self {
        if days < 0 {
            ExpiryStatus::Expired
        } else if days <= EXPIRY_WARNING_DAYS {
            ExpiryStatus::ExpiringSoon
        } else {
            ExpiryStatus::Valid
        }
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Negativo si ya venció
pub fn days_until(expiry: NaiveDate, today: NaiveDate) -> i64 {
    (expiry - today).num_days()
}
