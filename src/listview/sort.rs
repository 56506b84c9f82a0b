//! Comparador de orden
//!
//! Compara los valores como texto con orden "natural": las secuencias de
//! dígitos se comparan por valor numérico ("2" antes que "10") y las letras
//! sin distinguir mayúsculas.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

use serde::{Deserialize, Serialize};

use super::record::Record;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Acepta `asc`/`ascending` y `desc`/`descending`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(SortDirection::Ascending),
            "desc" | "descending" => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

/// Compara dos registros por `sort_key`
pub fn compare<R: Record + ?Sized>(
    a: &R,
    b: &R,
    sort_key: &str,
    direction: SortDirection,
) -> Ordering {
    let left = a.field(sort_key).to_display_string();
    let right = b.field(sort_key).to_display_string();
    let ordering = natural_compare(&left, &right);
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Ordena en sitio. `sort_by` es estable: los empates conservan el orden
/// de entrada.
pub fn sort_records<R: Record>(records: &mut [R], sort_key: &str, direction: SortDirection) {
    records.sort_by(|a, b| compare(a, b, sort_key, direction));
}

/// Orden natural sin distinguir mayúsculas; si los textos solo difieren en
/// mayúsculas, la minúscula va primero.
pub fn natural_compare(a: &str, b: &str) -> Ordering {
    match folded_compare(a, b) {
        Ordering::Equal => case_tiebreak(a, b),
        ordering => ordering,
    }
}

fn folded_compare(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let left_run = take_digits(&mut left);
                let right_run = take_digits(&mut right);
                let ordering = compare_digit_runs(&left_run, &right_run);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                left.next();
                right.next();
                let ordering = l.to_lowercase().cmp(r.to_lowercase());
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        // "007" y "7" valen lo mismo; el de más ceros va después
        .then_with(|| a.len().cmp(&b.len()))
}

fn case_tiebreak(a: &str, b: &str) -> Ordering {
    for (l, r) in a.chars().zip(b.chars()) {
        if l == r {
            continue;
        }
        return match (l.is_lowercase(), r.is_lowercase()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => l.cmp(&r),
        };
    }
    a.len().cmp(&b.len())
}
