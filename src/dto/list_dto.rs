//! Parámetros de listado recibidos por query string
//!
//! `search`, `sort`, `direction`, `page` y `page_size` son reservados;
//! cualquier otra clave es un filtro exacto sobre ese campo.

use std::collections::{BTreeMap, HashMap};

use crate::listview::{ListViewController, Record, SortDirection};
use crate::utils::errors::{bad_request_error, AppResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<SortDirection>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn from_params(params: HashMap<String, String>) -> AppResult<Self> {
        let mut query = ListQuery::default();
        for (key, value) in params {
            match key.as_str() {
                "search" | "q" => query.search = Some(value),
                "sort" => query.sort = Some(value).filter(|v| !v.trim().is_empty()),
                "direction" => {
                    let direction = SortDirection::parse(&value).ok_or_else(|| {
                        bad_request_error(&format!("Invalid sort direction '{}'", value))
                    })?;
                    query.direction = Some(direction);
                }
                "page" => query.page = Some(parse_number("page", &value)?),
                "page_size" => query.page_size = Some(parse_number("page_size", &value)?),
                _ => {
                    query.filters.insert(key, value);
                }
            }
        }
        Ok(query)
    }

    /// Aplica los parámetros en el orden en que lo haría un usuario:
    /// filtros, orden, tamaño de página y por último la página
    pub fn apply<R: Record>(&self, controller: &mut ListViewController<R>) {
        if let Some(search) = &self.search {
            controller.set_search_text(search.clone());
        }
        for (field, value) in &self.filters {
            controller.set_filter(field, value.clone());
        }
        match (&self.sort, self.direction) {
            (Some(key), Some(direction)) => controller.sort_by(key, direction),
            (Some(key), None) => controller.sort_by(key, SortDirection::Ascending),
            (None, Some(direction)) => {
                let key = controller.state().sort_key.clone();
                controller.sort_by(&key, direction);
            }
            (None, None) => {}
        }
        if let Some(page_size) = self.page_size {
            controller.set_page_size(page_size);
        }
        if let Some(page) = self.page {
            controller.set_page(page);
        }
    }
}

fn parse_number(key: &str, value: &str) -> AppResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| bad_request_error(&format!("'{}' must be a non-negative integer", key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_reserved_keys_and_filters() {
        let query = ListQuery::from_params(params(&[
            ("search", "ford"),
            ("sort", "year"),
            ("direction", "desc"),
            ("page", "2"),
            ("status", "active"),
        ]))
        .unwrap();
        assert_eq!(query.search.as_deref(), Some("ford"));
        assert_eq!(query.direction, Some(SortDirection::Descending));
        assert_eq!(query.page, Some(2));
        assert_eq!(query.filters.get("status").map(String::as_str), Some("active"));
    }

    #[test]
    fn test_invalid_numbers_and_directions() {
        assert!(ListQuery::from_params(params(&[("page", "-1")])).is_err());
        assert!(ListQuery::from_params(params(&[("direction", "sideways")])).is_err());
    }
}
