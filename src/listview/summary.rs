//! Agregador de resúmenes para las tarjetas del dashboard
//!
//! Siempre se evalúa sobre el conjunto filtrado completo, nunca sobre la
//! página visible.

use std::collections::BTreeMap;
use std::fmt;

use super::record::Record;

/// Resultado: etiqueta de tarjeta → valor
pub type Summary = BTreeMap<String, f64>;

type Predicate<R> = Box<dyn Fn(&R) -> bool + Send + Sync>;

/// Una agregación sobre el conjunto filtrado
pub enum Aggregation<R> {
    /// Número de registros
    Count,
    /// Registros que cumplen el predicado
    CountWhere(Predicate<R>),
    /// Registros cuyo campo es exactamente `value`
    CountEquals { field: String, value: String },
    /// Suma del campo; ausente o no numérico cuenta como 0
    Sum(String),
    /// Suma del campo / número de registros (0 si no hay registros)
    Average(String),
    /// Suma de `numerator` / suma de `denominator` (0 si el denominador es 0)
    Ratio { numerator: String, denominator: String },
}

impl<R> fmt::Debug for Aggregation<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::Count => write!(f, "Count"),
            Aggregation::CountWhere(_) => write!(f, "CountWhere(..)"),
            Aggregation::CountEquals { field, value } => write!(f, "CountEquals({field}={value})"),
            Aggregation::Sum(field) => write!(f, "Sum({field})"),
            Aggregation::Average(field) => write!(f, "Average({field})"),
            Aggregation::Ratio { numerator, denominator } => {
                write!(f, "Ratio({numerator}/{denominator})")
            }
        }
    }
}

impl<R> Aggregation<R> {
    /// Campos leídos; los predicados de `CountWhere` no declaran los suyos
    fn fields(&self) -> Vec<&str> {
        match self {
            Aggregation::Count | Aggregation::CountWhere(_) => Vec::new(),
            Aggregation::CountEquals { field, .. } => vec![field.as_str()],
            Aggregation::Sum(field) | Aggregation::Average(field) => vec![field.as_str()],
            Aggregation::Ratio { numerator, denominator } => {
                vec![numerator.as_str(), denominator.as_str()]
            }
        }
    }
}

/// Lista ordenada de (etiqueta, agregación)
#[derive(Debug)]
pub struct SummarySpec<R> {
    entries: Vec<(String, Aggregation<R>)>,
}

impl<R> Default for SummarySpec<R> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<R> SummarySpec<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quita las tarjetas que leen alguno de los campos `hidden`
    pub fn without_fields(mut self, hidden: &[&str]) -> Self {
        self.entries.retain(|(_, aggregation)| {
            aggregation
                .fields()
                .iter()
                .all(|field| !hidden.contains(field))
        });
        self
    }

    pub fn with(mut self, label: impl Into<String>, aggregation: Aggregation<R>) -> Self {
        self.entries.push((label.into(), aggregation));
        self
    }

    pub fn count(self, label: impl Into<String>) -> Self {
        self.with(label, Aggregation::Count)
    }

    pub fn count_where<F>(self, label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.with(label, Aggregation::CountWhere(Box::new(predicate)))
    }

    pub fn count_equals(
        self,
        label: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.with(
            label,
            Aggregation::CountEquals {
                field: field.into(),
                value: value.into(),
            },
        )
    }

    pub fn sum(self, label: impl Into<String>, field: impl Into<String>) -> Self {
        self.with(label, Aggregation::Sum(field.into()))
    }

    pub fn average(self, label: impl Into<String>, field: impl Into<String>) -> Self {
        self.with(label, Aggregation::Average(field.into()))
    }

    pub fn ratio(
        self,
        label: impl Into<String>,
        numerator: impl Into<String>,
        denominator: impl Into<String>,
    ) -> Self {
        self.with(
            label,
            Aggregation::Ratio {
                numerator: numerator.into(),
                denominator: denominator.into(),
            },
        )
    }
}

fn sum_field<R: Record>(records: &[&R], field: &str) -> f64 {
    records
        .iter()
        .map(|record| record.field(field).as_number().unwrap_or(0.0))
        .sum()
}

fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Calcula todas las agregaciones del `spec` sobre `filtered`
pub fn summarize<R: Record>(filtered: &[&R], spec: &SummarySpec<R>) -> Summary {
    spec.entries
        .iter()
        .map(|(label, aggregation)| {
            let value = match aggregation {
                Aggregation::Count => filtered.len() as f64,
                Aggregation::CountWhere(predicate) => {
                    filtered.iter().filter(|record| predicate(**record)).count() as f64
                }
                Aggregation::CountEquals { field, value } => filtered
                    .iter()
                    .filter(|record| record.field(field).to_display_string() == *value)
                    .count() as f64,
                Aggregation::Sum(field) => sum_field(filtered, field),
                Aggregation::Average(field) => {
                    safe_div(sum_field(filtered, field), filtered.len() as f64)
                }
                Aggregation::Ratio {
                    numerator,
                    denominator,
                } => safe_div(
                    sum_field(filtered, numerator),
                    sum_field(filtered, denominator),
                ),
            };
            (label.clone(), value)
        })
        .collect()
}
