//! Pipeline de listados
//!
//! Filtro, orden, paginación, resúmenes y exportación CSV comunes a todas
//! las páginas de entidades, parametrizados por `EntityListConfig`.

pub mod controller;
pub mod csv_export;
pub mod filter;
pub mod paginate;
pub mod record;
pub mod sort;
pub mod summary;

pub use controller::{
    ColumnSpec, EntityListConfig, ListPage, ListState, ListStatus, ListView, ListViewController,
    LoadTicket, ViewContext, DEFAULT_PAGE_SIZE,
};
pub use csv_export::{export_file_name, to_csv, ExportError};
pub use filter::{filter_records, is_unselected, matches, FilterState};
pub use paginate::{page_count, paginate, PageSlice};
pub use record::{visible_record, FieldValue, Record, ToFieldValue};
pub use sort::{compare, natural_compare, sort_records, SortDirection};
pub use summary::{summarize, Aggregation, Summary, SummarySpec};
