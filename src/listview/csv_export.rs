//! Exportación CSV
//!
//! Todos los campos van entre comillas dobles, con las comillas internas
//! duplicadas. La cabecera son los nombres de campo del primer registro,
//! menos los campos ocultos.

use thiserror::Error;

use super::record::Record;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("No hay registros para exportar")]
    NothingToExport,
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Genera el CSV en el orden de entrada, omitiendo los campos de `hidden`.
/// Una lista vacía no produce fichero.
pub fn to_csv<'a, R, I>(records: I, hidden: &[&str]) -> Result<String, ExportError>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut records = records.into_iter().peekable();
    let header = match records.peek() {
        Some(first) => first
            .field_names()
            .into_iter()
            .filter(|name| !hidden.contains(&name.as_str()))
            .collect::<Vec<_>>(),
        None => return Err(ExportError::NothingToExport),
    };

    let mut lines = Vec::new();
    lines.push(
        header
            .iter()
            .map(|name| quote(name))
            .collect::<Vec<_>>()
            .join(","),
    );

    for record in records {
        let line = header
            .iter()
            .map(|name| quote(&record.field(name).to_display_string()))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    Ok(lines.join("\n"))
}

/// Nombre de fichero con la fecha del día, p. ej. `vehicles_2024-05-01.csv`
pub fn export_file_name(collection: &str, date: chrono::NaiveDate) -> String {
    format!("{}_{}.csv", collection, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn records(values: Value) -> Vec<Map<String, Value>> {
        values
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_comma_preserved_inside_quotes() {
        let rows = records(json!([{"a": 1, "b": "x,y"}]));
        let csv = to_csv(&rows, &[]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec![r#""a","b""#, r#""1","x,y""#]);
    }

    #[test]
    fn test_quotes_are_doubled_and_nulls_empty() {
        let rows = records(json!([{"a": "say \"hi\"", "b": null}]));
        let csv = to_csv(&rows, &[]).unwrap();
        assert_eq!(csv.lines().nth(1), Some(r#""say ""hi""","""#));
    }

    #[test]
    fn test_empty_list_is_nothing_to_export() {
        let rows: Vec<Map<String, Value>> = Vec::new();
        assert_eq!(to_csv(&rows, &[]), Err(ExportError::NothingToExport));
    }

    #[test]
    fn test_row_order_follows_input() {
        let rows = records(json!([{"n": 3}, {"n": 1}, {"n": 2}]));
        let csv = to_csv(&rows, &[]).unwrap();
        let body: Vec<&str> = csv.lines().skip(1).collect();
        assert_eq!(body, vec![r#""3""#, r#""1""#, r#""2""#]);
    }

    #[test]
    fn test_header_comes_from_first_record() {
        let rows = records(json!([{"a": 1}, {"a": 2, "extra": "ignored"}]));
        let csv = to_csv(&rows, &[]).unwrap();
        assert_eq!(csv, "\"a\"\n\"1\"\n\"2\"");
    }

    #[test]
    fn test_hidden_fields_are_left_out() {
        let rows = records(json!([{"plate": "CA 1", "vin": "WVW", "cost": 10}]));
        let csv = to_csv(&rows, &["vin", "cost"]).unwrap();
        assert_eq!(csv, "\"plate\"\n\"CA 1\"");
    }

    #[test]
    fn test_export_file_name() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(export_file_name("fuel_logs", date), "fuel_logs_2024-05-01.csv");
    }
}
