//! Controlador de listados
//!
//! Máquina de estados que posee búsqueda, filtros, orden y página de un
//! listado de entidades. La vista derivada se recalcula completa en cada
//! lectura: `paginate(sort(filter(source)))`.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::csv_export::{to_csv, ExportError};
use super::filter::{filter_records, is_unselected, matches, FilterState};
use super::paginate::{page_count, paginate};
use super::record::{visible_record, Record};
use super::sort::{compare, SortDirection};
use super::summary::{summarize, Summary, SummarySpec};
use crate::models::role::Role;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Columna de la tabla y el rol mínimo que puede verla
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSpec {
    pub field: &'static str,
    pub label: &'static str,
    #[serde(skip)]
    pub min_role: Role,
}

impl ColumnSpec {
    pub const fn new(field: &'static str, label: &'static str) -> Self {
        Self {
            field,
            label,
            min_role: Role::Staff,
        }
    }

    pub const fn restricted(field: &'static str, label: &'static str, min_role: Role) -> Self {
        Self {
            field,
            label,
            min_role,
        }
    }

    pub fn visible_to(&self, role: Role) -> bool {
        role >= self.min_role
    }
}

/// Configuración por entidad del pipeline de listado
#[derive(Debug)]
pub struct EntityListConfig<R> {
    pub searchable_fields: Vec<&'static str>,
    pub filter_fields: Vec<&'static str>,
    pub default_sort_key: &'static str,
    pub default_sort_direction: SortDirection,
    pub default_page_size: usize,
    pub columns: Vec<ColumnSpec>,
    pub summary: SummarySpec<R>,
}

impl<R> EntityListConfig<R> {
    pub fn new(default_sort_key: &'static str) -> Self {
        Self {
            searchable_fields: Vec::new(),
            filter_fields: Vec::new(),
            default_sort_key,
            default_sort_direction: SortDirection::Ascending,
            default_page_size: DEFAULT_PAGE_SIZE,
            columns: Vec::new(),
            summary: SummarySpec::new(),
        }
    }

    pub fn searchable(mut self, fields: &[&'static str]) -> Self {
        self.searchable_fields = fields.to_vec();
        self
    }

    pub fn filters(mut self, fields: &[&'static str]) -> Self {
        self.filter_fields = fields.to_vec();
        self
    }

    pub fn sorted_descending(mut self) -> Self {
        self.default_sort_direction = SortDirection::Descending;
        self
    }

    pub fn columns(mut self, columns: Vec<ColumnSpec>) -> Self {
        self.columns = columns;
        self
    }

    pub fn summary(mut self, summary: SummarySpec<R>) -> Self {
        self.summary = summary;
        self
    }
}

/// Contexto explícito de quien mira el listado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewContext {
    pub role: Role,
}

impl ViewContext {
    pub fn new(role: Role) -> Self {
        Self { role }
    }
}

/// Identifica una carga; los resultados de cargas superadas se descartan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone)]
pub struct ListState<R> {
    pub filters: FilterState,
    pub sort_key: String,
    pub sort_direction: SortDirection,
    pub page: usize,
    pub page_size: usize,
    pub source_records: Vec<R>,
    pub is_loading: bool,
}

/// Rama de renderizado del listado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStatus {
    Loading,
    Empty,
    NoMatches,
    Populated,
}

/// Vista derivada, prestada del controlador
#[derive(Debug, Serialize)]
pub struct ListView<'a, R> {
    pub items: Vec<&'a R>,
    pub page: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub filtered_count: usize,
    pub total_count: usize,
    pub summary: Summary,
    pub columns: Vec<&'a ColumnSpec>,
    pub status: ListStatus,
}

/// Vista derivada lista para serializar. Cada registro lleva solo los
/// campos que el rol puede ver.
#[derive(Debug, Clone, Serialize)]
pub struct ListPage {
    pub items: Vec<Map<String, Value>>,
    pub page: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub filtered_count: usize,
    pub total_count: usize,
    pub summary: Summary,
    pub columns: Vec<ColumnSpec>,
    pub status: ListStatus,
    pub filters: BTreeMap<String, String>,
    /// Mensaje del backend cuando la carga falló
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct ListViewController<R> {
    config: EntityListConfig<R>,
    context: ViewContext,
    state: ListState<R>,
    load_generation: u64,
    last_error: Option<String>,
    /// Campos de columnas que el rol no puede ver
    hidden_fields: Vec<&'static str>,
    /// Campos de búsqueda sin los ocultos al rol
    search_fields: Vec<&'static str>,
}

impl<R: Record> ListViewController<R> {
    pub fn new(mut config: EntityListConfig<R>, context: ViewContext) -> Self {
        let state = ListState {
            filters: FilterState::default(),
            sort_key: config.default_sort_key.to_string(),
            sort_direction: config.default_sort_direction,
            page: 1,
            page_size: config.default_page_size.max(1),
            source_records: Vec::new(),
            is_loading: false,
        };
        let hidden_fields: Vec<&'static str> = config
            .columns
            .iter()
            .filter(|column| !column.visible_to(context.role))
            .map(|column| column.field)
            .collect();
        let search_fields = config
            .searchable_fields
            .iter()
            .copied()
            .filter(|field| !hidden_fields.contains(field))
            .collect();
        config.summary = std::mem::take(&mut config.summary).without_fields(&hidden_fields);
        Self {
            config,
            context,
            state,
            load_generation: 0,
            last_error: None,
            hidden_fields,
            search_fields,
        }
    }

    /// Un campo es visible si ninguna columna restringida al rol lo muestra
    pub fn is_visible(&self, field: &str) -> bool {
        !self.hidden_fields.contains(&field)
    }

    pub fn state(&self) -> &ListState<R> {
        &self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.state.filters.search_text != text {
            self.state.filters.search_text = text;
            self.state.page = 1;
        }
    }

    /// Fija un filtro exacto. Los campos no configurados como filtro, o
    /// que el rol no puede ver, se ignoran y devuelven `false`.
    pub fn set_filter(&mut self, field: &str, value: impl Into<String>) -> bool {
        if !self.config.filter_fields.contains(&field) || !self.is_visible(field) {
            return false;
        }
        let value = value.into();
        let previous = self.state.filters.exact_filters.get(field);
        let changed = match previous {
            Some(current) => *current != value,
            None => !is_unselected(&value),
        };
        if is_unselected(&value) {
            self.state.filters.exact_filters.remove(field);
        } else {
            self.state.filters.exact_filters.insert(field.to_string(), value);
        }
        if changed {
            self.state.page = 1;
        }
        true
    }

    /// Misma clave: invierte la dirección. Clave nueva: ascendente.
    /// Una clave oculta al rol no cambia el orden.
    pub fn set_sort(&mut self, key: &str) {
        if !self.is_visible(key) {
            return;
        }
        if self.state.sort_key == key {
            self.state.sort_direction = self.state.sort_direction.toggled();
        } else {
            self.state.sort_key = key.to_string();
            self.state.sort_direction = SortDirection::Ascending;
        }
        self.state.page = 1;
    }

    /// Fija clave y dirección explícitas (parámetros de consulta)
    pub fn sort_by(&mut self, key: &str, direction: SortDirection) {
        if !self.is_visible(key) {
            return;
        }
        if self.state.sort_key != key || self.state.sort_direction != direction {
            self.state.sort_key = key.to_string();
            self.state.sort_direction = direction;
            self.state.page = 1;
        }
    }

    /// Una página fuera de rango vuelve a la 1
    pub fn set_page(&mut self, page: usize) {
        self.state.page = page;
        self.normalize_page();
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.state.page_size = page_size.max(1);
        self.normalize_page();
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        self.state.is_loading = true;
        LoadTicket(self.load_generation)
    }

    pub fn data_loaded(&mut self, records: Vec<R>) {
        self.state.source_records = records;
        self.state.is_loading = false;
        self.last_error = None;
        self.normalize_page();
    }

    /// Aplica el resultado solo si `ticket` es la carga más reciente.
    /// Devuelve `false` si el resultado se descartó.
    pub fn data_loaded_for(&mut self, ticket: LoadTicket, records: Vec<R>) -> bool {
        if ticket.0 != self.load_generation {
            return false;
        }
        self.data_loaded(records);
        true
    }

    /// Un fallo de carga deja el listado vacío con el mensaje del backend
    pub fn load_failed(&mut self, ticket: LoadTicket, message: impl Into<String>) -> bool {
        if ticket.0 != self.load_generation {
            return false;
        }
        self.state.source_records.clear();
        self.state.is_loading = false;
        self.last_error = Some(message.into());
        self.normalize_page();
        true
    }

    fn normalize_page(&mut self) {
        let count = page_count(self.filtered_len(), self.state.page_size);
        if self.state.page == 0 || self.state.page > count {
            self.state.page = 1;
        }
    }

    fn filtered_len(&self) -> usize {
        self.state
            .source_records
            .iter()
            .filter(|record| {
                matches(*record, &self.state.filters, &self.search_fields)
            })
            .count()
    }

    /// Registros filtrados y ordenados, sin paginar
    pub fn filtered(&self) -> Vec<&R> {
        let mut rows =
            filter_records(&self.state.source_records, &self.state.filters, &self.search_fields);
        let key = self.state.sort_key.as_str();
        let direction = self.state.sort_direction;
        rows.sort_by(|a, b| compare(*a, *b, key, direction));
        rows
    }

    pub fn visible_columns(&self) -> Vec<&ColumnSpec> {
        self.config
            .columns
            .iter()
            .filter(|column| column.visible_to(self.context.role))
            .collect()
    }

    pub fn view(&self) -> ListView<'_, R> {
        let filtered = self.filtered();
        let summary = summarize(&filtered, &self.config.summary);
        let slice = paginate(&filtered, self.state.page, self.state.page_size);

        let status = if self.state.is_loading {
            ListStatus::Loading
        } else if self.state.source_records.is_empty() {
            ListStatus::Empty
        } else if filtered.is_empty() {
            ListStatus::NoMatches
        } else {
            ListStatus::Populated
        };

        ListView {
            items: slice.page_items,
            page: self.state.page,
            page_size: self.state.page_size,
            page_count: slice.page_count,
            filtered_count: filtered.len(),
            total_count: self.state.source_records.len(),
            summary,
            columns: self.visible_columns(),
            status,
        }
    }

    /// Página actual con los registros reducidos a los campos visibles
    pub fn page(&self) -> ListPage {
        let view = self.view();
        ListPage {
            items: view
                .items
                .iter()
                .map(|record| visible_record(*record, &self.hidden_fields))
                .collect(),
            page: view.page,
            page_size: view.page_size,
            page_count: view.page_count,
            filtered_count: view.filtered_count,
            total_count: view.total_count,
            summary: view.summary,
            columns: view.columns.into_iter().cloned().collect(),
            status: view.status,
            filters: self.active_filters(),
            error: self.last_error.clone(),
        }
    }

    /// CSV del conjunto filtrado y ordenado, nunca de la página actual,
    /// sin los campos ocultos al rol
    pub fn export_csv(&self) -> Result<String, ExportError> {
        to_csv(self.filtered(), &self.hidden_fields)
    }

    /// Filtros exactos activos
    pub fn active_filters(&self) -> BTreeMap<String, String> {
        self.state
            .filters
            .active_filters()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn vehicles(count: usize) -> Vec<Map<String, Value>> {
        (1..=count)
            .map(|i| {
                json!({
                    "registration_number": format!("CA {i}"),
                    "make": if i % 2 == 0 { "Ford" } else { "Iveco" },
                    "status": if i % 5 == 0 { "maintenance" } else { "active" },
                    "odometer_km": i * 1000,
                })
                .as_object()
                .cloned()
                .unwrap()
            })
            .collect()
    }

    fn config() -> EntityListConfig<Map<String, Value>> {
        EntityListConfig::new("registration_number")
            .searchable(&["registration_number", "make"])
            .filters(&["status", "make"])
            .columns(vec![
                ColumnSpec::new("registration_number", "Registration"),
                ColumnSpec::restricted("odometer_km", "Odometer", Role::Manager),
            ])
            .summary(SummarySpec::new().count("total").sum("total_km", "odometer_km"))
    }

    fn controller(count: usize) -> ListViewController<Map<String, Value>> {
        let mut controller = ListViewController::new(config(), ViewContext::new(Role::Admin));
        controller.data_loaded(vehicles(count));
        controller
    }

    #[test]
    fn test_filter_changes_reset_page() {
        let mut c = controller(25);
        c.set_page(3);
        c.set_search_text("ford");
        assert_eq!(c.state().page, 1);

        c.set_page(2);
        c.set_filter("status", "active");
        assert_eq!(c.state().page, 1);

        c.set_page(2);
        c.set_sort("odometer_km");
        assert_eq!(c.state().page, 1);
    }

    #[test]
    fn test_set_sort_toggles_on_same_key() {
        let mut c = controller(3);
        assert_eq!(c.state().sort_direction, SortDirection::Ascending);
        c.set_sort("registration_number");
        assert_eq!(c.state().sort_direction, SortDirection::Descending);
        c.set_sort("make");
        assert_eq!(c.state().sort_key, "make");
        assert_eq!(c.state().sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn test_unknown_filter_field_is_ignored() {
        let mut c = controller(5);
        assert!(!c.set_filter("vin", "X"));
        assert!(c.active_filters().is_empty());
        assert_eq!(c.view().filtered_count, 5);
    }

    #[test]
    fn test_unselected_filter_clears_it() {
        let mut c = controller(10);
        c.set_filter("status", "maintenance");
        assert_eq!(c.view().filtered_count, 2);
        c.set_filter("status", "all");
        assert_eq!(c.view().filtered_count, 10);
    }

    #[test]
    fn test_summary_ignores_page_and_page_size() {
        let mut c = controller(25);
        let before = c.view().summary;
        c.set_page_size(3);
        c.set_page(4);
        assert_eq!(c.view().summary, before);
        assert_eq!(c.view().summary["total"], 25.0);
        assert_eq!(c.view().items.len(), 3);
    }

    #[test]
    fn test_page_size_change_clamps_page() {
        let mut c = controller(25);
        c.set_page(3);
        c.set_page_size(50);
        assert_eq!(c.state().page, 1);
        assert_eq!(c.view().page_count, 1);
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let mut c = ListViewController::new(config(), ViewContext::new(Role::Staff));
        let first = c.begin_load();
        let second = c.begin_load();
        assert!(c.data_loaded_for(second, vehicles(4)));
        assert!(!c.data_loaded_for(first, vehicles(20)));
        assert_eq!(c.state().source_records.len(), 4);
        assert!(!c.state().is_loading);
    }

    #[test]
    fn test_load_failure_leaves_empty_list() {
        let mut c = controller(12);
        let ticket = c.begin_load();
        assert_eq!(c.view().status, ListStatus::Loading);
        assert!(c.load_failed(ticket, "connection refused"));
        assert_eq!(c.last_error(), Some("connection refused"));
        let view = c.view();
        assert!(view.items.is_empty());
        assert_eq!(view.status, ListStatus::Empty);
    }

    #[test]
    fn test_empty_and_no_match_states() {
        let mut c = controller(0);
        assert_eq!(c.view().status, ListStatus::Empty);
        c.data_loaded(vehicles(3));
        c.set_search_text("zzz");
        let view = c.view();
        assert!(view.items.is_empty());
        assert_eq!(view.status, ListStatus::NoMatches);
    }

    #[test]
    fn test_columns_follow_role() {
        let staff = ListViewController::new(config(), ViewContext::new(Role::Staff));
        let fields: Vec<&str> = staff.visible_columns().iter().map(|c| c.field).collect();
        assert_eq!(fields, vec!["registration_number"]);

        let manager = ListViewController::new(config(), ViewContext::new(Role::Manager));
        assert_eq!(manager.visible_columns().len(), 2);
    }

    #[test]
    fn test_export_uses_full_filtered_sorted_set() {
        let mut c = controller(25);
        c.set_filter("make", "Ford");
        c.sort_by("odometer_km", SortDirection::Descending);
        c.set_page_size(5);
        let csv = c.export_csv().unwrap();
        let rows: Vec<&str> = csv.lines().skip(1).collect();
        assert_eq!(rows.len(), 12);
        assert!(rows[0].contains("\"24000\""));
        assert!(rows[11].contains("\"2000\""));
    }

    #[test]
    fn test_export_of_empty_filter_signals_nothing() {
        let mut c = controller(5);
        c.set_search_text("nothing matches this");
        assert_eq!(c.export_csv(), Err(ExportError::NothingToExport));
    }
}
