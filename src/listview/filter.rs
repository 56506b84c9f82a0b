//! Evaluador de filtros
//!
//! Búsqueda libre por subcadena sobre un conjunto fijo de campos más filtros
//! exactos tipo desplegable. Un registro pasa solo si cumple todos los
//! criterios activos.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::record::Record;

/// Valor de desplegable "sin seleccionar"
pub const UNSELECTED: &str = "all";

/// Estado de filtrado de un listado
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub search_text: String,
    pub exact_filters: BTreeMap<String, String>,
}

impl FilterState {
    pub fn new(search_text: impl Into<String>) -> Self {
        Self {
            search_text: search_text.into(),
            exact_filters: BTreeMap::new(),
        }
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.exact_filters.insert(field.into(), value.into());
        self
    }

    /// Filtros exactos que realmente restringen el resultado
    pub fn active_filters(&self) -> impl Iterator<Item = (&String, &String)> {
        self.exact_filters
            .iter()
            .filter(|(_, value)| !is_unselected(value))
    }
}

/// `""` y `"all"` significan que el desplegable no tiene selección
pub fn is_unselected(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNSELECTED)
}

/// Evalúa si el registro cumple todos los criterios activos
pub fn matches<R: Record + ?Sized>(
    record: &R,
    filters: &FilterState,
    searchable_fields: &[&str],
) -> bool {
    matches_search(record, &filters.search_text, searchable_fields)
        && filters
            .active_filters()
            .all(|(field, expected)| record.field(field).to_display_string() == *expected)
}

fn matches_search<R: Record + ?Sized>(record: &R, search_text: &str, fields: &[&str]) -> bool {
    if search_text.is_empty() {
        return true;
    }
    let needle = search_text.to_lowercase();
    fields.iter().any(|field| {
        record
            .field(field)
            .to_display_string()
            .to_lowercase()
            .contains(&needle)
    })
}

/// Aplica el filtro conservando el orden de entrada
pub fn filter_records<'a, R: Record>(
    records: &'a [R],
    filters: &FilterState,
    searchable_fields: &[&str],
) -> Vec<&'a R> {
    records
        .iter()
        .filter(|record| matches(*record, filters, searchable_fields))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn vehicle(plate: &str, make: &str, status: &str, vin: Option<&str>) -> Map<String, Value> {
        json!({
            "registration_number": plate,
            "make": make,
            "model": "Transit",
            "vin": vin,
            "status": status,
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    const FIELDS: &[&str] = &["registration_number", "make", "model", "vin"];

    #[test]
    fn test_empty_state_matches_everything() {
        let record = vehicle("CA 123", "Ford", "active", None);
        assert!(matches(&record, &FilterState::default(), FIELDS));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let record = vehicle("CA 123-456", "Ford", "active", None);
        assert!(matches(&record, &FilterState::new("fOr"), FIELDS));
        assert!(matches(&record, &FilterState::new("123-4"), FIELDS));
        assert!(!matches(&record, &FilterState::new("toyota"), FIELDS));
    }

    #[test]
    fn test_missing_searchable_field_does_not_panic() {
        let record = vehicle("CA 1", "Ford", "active", None);
        assert!(!matches(&record, &FilterState::new("wvw"), FIELDS));
        assert!(matches(&record, &FilterState::new("ford"), &["no_such_field", "make"]));
    }

    #[test]
    fn test_unselected_sentinel_is_skipped() {
        let record = vehicle("CA 1", "Ford", "active", None);
        let state = FilterState::default()
            .with_filter("status", "all")
            .with_filter("make", "");
        assert!(matches(&record, &state, FIELDS));
    }

    #[test]
    fn test_conjunction_of_criteria() {
        let record = vehicle("CA 1", "Ford", "active", Some("WVW123"));

        let all_pass = FilterState::new("wvw")
            .with_filter("status", "active")
            .with_filter("make", "Ford");
        assert!(matches(&record, &all_pass, FIELDS));

        let one_fails = FilterState::new("wvw")
            .with_filter("status", "maintenance")
            .with_filter("make", "Ford");
        assert!(!matches(&record, &one_fails, FIELDS));

        let search_fails = FilterState::new("zzz").with_filter("status", "active");
        assert!(!matches(&record, &search_fails, FIELDS));
    }

    #[test]
    fn test_exact_filter_is_not_substring() {
        let record = vehicle("CA 1", "Ford", "active", None);
        let state = FilterState::default().with_filter("status", "act");
        assert!(!matches(&record, &state, FIELDS));
    }

    #[test]
    fn test_filter_records_keeps_input_order() {
        let records = vec![
            vehicle("A", "Ford", "active", None),
            vehicle("B", "Iveco", "active", None),
            vehicle("C", "Ford", "retired", None),
            vehicle("D", "Ford", "active", None),
        ];
        let state = FilterState::new("ford").with_filter("status", "active");
        let plates: Vec<String> = filter_records(&records, &state, FIELDS)
            .iter()
            .map(|r| r.field("registration_number").to_display_string())
            .collect();
        assert_eq!(plates, vec!["A", "D"]);
    }
}
