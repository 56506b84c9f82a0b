//! Utilidades de validación
//!
//! Reglas compartidas por los formularios de alta y edición. Un formulario
//! inválido nunca llega al backend.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

lazy_static! {
    /// Matrícula: letras, dígitos, espacios y guiones
    pub static ref RE_REGISTRATION: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]{1,14}$").unwrap();
    /// VIN de 17 caracteres sin I, O ni Q
    pub static ref RE_VIN: Regex = Regex::new(r"^[A-HJ-NPR-Za-hj-npr-z0-9]{17}$").unwrap();
}

pub const VEHICLE_STATUSES: &[&str] = &["active", "maintenance", "out_of_service", "retired"];
pub const DRIVER_STATUSES: &[&str] = &["active", "inactive", "suspended"];
pub const SERVICE_STATUSES: &[&str] = &["scheduled", "in_progress", "completed", "cancelled"];
pub const ACCIDENT_SEVERITIES: &[&str] = &["minor", "moderate", "severe"];
pub const ACCIDENT_STATUSES: &[&str] = &["open", "under_review", "closed"];
pub const TYRE_STATUSES: &[&str] = &["in_use", "in_stock", "disposed"];

fn validate_enum(value: &str, allowed: &[&str], code: &'static str) -> Result<(), ValidationError> {
    if !allowed.contains(&value) {
        let mut error = ValidationError::new(code);
        error.add_param("value".into(), &value.to_string());
        error.add_param("allowed_values".into(), &allowed.join(", "));
        return Err(error);
    }
    Ok(())
}

pub fn validate_vehicle_status(value: &str) -> Result<(), ValidationError> {
    validate_enum(value, VEHICLE_STATUSES, "vehicle_status")
}

pub fn validate_driver_status(value: &str) -> Result<(), ValidationError> {
    validate_enum(value, DRIVER_STATUSES, "driver_status")
}

pub fn validate_service_status(value: &str) -> Result<(), ValidationError> {
    validate_enum(value, SERVICE_STATUSES, "service_status")
}

pub fn validate_accident_severity(value: &str) -> Result<(), ValidationError> {
    validate_enum(value, ACCIDENT_SEVERITIES, "accident_severity")
}

pub fn validate_accident_status(value: &str) -> Result<(), ValidationError> {
    validate_enum(value, ACCIDENT_STATUSES, "accident_status")
}

pub fn validate_tyre_status(value: &str) -> Result<(), ValidationError> {
    validate_enum(value, TYRE_STATUSES, "tyre_status")
}

/// Validar que un string no esté vacío
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_blank"));
    }
    Ok(())
}

/// Validar que un importe monetario no sea negativo
pub fn validate_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("actual".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que una fecha de vencimiento no sea anterior a la de emisión
pub fn validate_date_order(start: Option<NaiveDate>, end: NaiveDate) -> Result<(), ValidationError> {
    match start {
        Some(start) if start > end => {
            let mut error = ValidationError::new("date_order");
            error.add_param("start".into(), &start.to_string());
            error.add_param("end".into(), &end.to_string());
            Err(error)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_regex() {
        assert!(RE_REGISTRATION.is_match("CA 123-456"));
        assert!(RE_REGISTRATION.is_match("ND12345"));
        assert!(!RE_REGISTRATION.is_match(""));
        assert!(!RE_REGISTRATION.is_match("-CA"));
    }

    #[test]
    fn test_vin_regex() {
        assert!(RE_VIN.is_match("1FTFW1ET5DFC10312"));
        assert!(!RE_VIN.is_match("1FTFW1ET5DFC1031I"));
        assert!(!RE_VIN.is_match("SHORT"));
    }

    #[test]
    fn test_enum_validators() {
        assert!(validate_vehicle_status("maintenance").is_ok());
        assert!(validate_vehicle_status("flying").is_err());
        assert!(validate_accident_severity("severe").is_ok());
    }

    #[test]
    fn test_not_blank_and_amount() {
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_amount(&Decimal::new(-150, 2)).is_err());
        assert!(validate_amount(&Decimal::new(150, 2)).is_ok());
    }

    #[test]
    fn test_date_order() {
        let issue = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let expiry = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert!(validate_date_order(Some(issue), expiry).is_err());
        assert!(validate_date_order(None, expiry).is_ok());
    }
}
