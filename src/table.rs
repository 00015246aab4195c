use chrono::{NaiveDate, NaiveTime};
use std::collections::HashSet;

use crate::constants::{DATE_OUTPUT_FORMAT, TIME_FORMAT};

/// A row shape with a fixed, ordered set of named columns.
///
/// `cells` renders the row in column order exactly as it is written to CSV;
/// `None` is a missing cell.
pub trait Record: Clone {
    const COLUMNS: &'static [&'static str];

    fn cells(&self) -> Vec<Option<String>>;
}

/// A named, ordered collection of records. Stages take tables by value and
/// hand back new ones.
///
/// A table loaded from a file remembers which of `R::COLUMNS` its header
/// carried; shape, missing counts and previews only see those columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<R> {
    name: &'static str,
    rows: Vec<R>,
    present: Option<Vec<bool>>,
}

impl<R: Record> Table<R> {
    pub fn new(name: &'static str, rows: Vec<R>) -> Self {
        Self {
            name,
            rows,
            present: None,
        }
    }

    /// A table whose source held only the columns flagged in `present`,
    /// one flag per entry of `R::COLUMNS`.
    pub fn with_columns(name: &'static str, rows: Vec<R>, present: Vec<bool>) -> Self {
        Self {
            name,
            rows,
            present: Some(present),
        }
    }

    fn is_present(&self, idx: usize) -> bool {
        self.present
            .as_ref()
            .map_or(true, |p| p.get(idx).copied().unwrap_or(false))
    }

    /// Names of the columns this table actually carries, in `R::COLUMNS` order.
    pub fn columns(&self) -> Vec<&'static str> {
        R::COLUMNS
            .iter()
            .enumerate()
            .filter(|(idx, _)| self.is_present(*idx))
            .map(|(_, column)| *column)
            .collect()
    }

    /// Cells of `row` restricted to the columns this table carries.
    pub fn present_cells(&self, row: &R) -> Vec<Option<String>> {
        row.cells()
            .into_iter()
            .enumerate()
            .filter(|(idx, _)| self.is_present(*idx))
            .map(|(_, cell)| cell)
            .collect()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns().len())
    }

    pub fn missing_cells(&self) -> usize {
        self.rows
            .iter()
            .map(|row| {
                self.present_cells(row)
                    .iter()
                    .filter(|c| c.is_none())
                    .count()
            })
            .sum()
    }

    pub fn head(&self, n: usize) -> &[R] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Keep rows matching `keep`, in order.
    pub fn filter(self, keep: impl Fn(&R) -> bool) -> Self {
        let Self {
            name,
            rows,
            present,
        } = self;
        let rows = rows.into_iter().filter(|r| keep(r)).collect();
        Self {
            name,
            rows,
            present,
        }
    }

    /// Apply `f` to every row, producing a table of another shape under `name`.
    pub fn map<S: Record>(self, name: &'static str, f: impl FnMut(R) -> S) -> Table<S> {
        Table::new(name, self.rows.into_iter().map(f).collect())
    }

    /// Drop rows identical to an earlier row across all columns, missing
    /// matching missing. Returns the table and the number of rows removed.
    pub fn dedup(self) -> (Self, usize) {
        let Self {
            name,
            rows,
            present,
        } = self;
        let before = rows.len();
        let mut seen: HashSet<Vec<Option<String>>> = HashSet::with_capacity(before);
        let rows: Vec<R> = rows.into_iter().filter(|r| seen.insert(r.cells())).collect();
        let removed = before - rows.len();
        (
            Self {
                name,
                rows,
                present,
            },
            removed,
        )
    }
}

pub fn text_cell(value: &Option<String>) -> Option<String> {
    value.clone()
}

/// Join keys are never absent in memory; an empty key is a missing cell.
pub fn key_cell(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub fn date_cell(value: &Option<NaiveDate>) -> Option<String> {
    value.map(|d| d.format(DATE_OUTPUT_FORMAT).to_string())
}

pub fn time_cell(value: &Option<NaiveTime>) -> Option<String> {
    value.map(|t| t.format(TIME_FORMAT).to_string())
}

pub fn number_cell(value: &Option<f64>) -> Option<String> {
    value.map(format_number)
}

/// Shortest round-trip form, integral values keep a trailing `.0`.
pub fn format_number(value: f64) -> String {
    format!("{value:?}")
}
