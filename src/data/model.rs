use std::fmt;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the observation table
// ---------------------------------------------------------------------------

/// A dynamically-typed table cell, as inferred by the loader.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Missing,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Missing => write!(f, "<missing>"),
        }
    }
}

impl CellValue {
    /// NaN floats count as missing, the same as an empty cell.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Missing => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of the cell. Text is parsed; `None` means not numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Missing => Some(f64::NAN),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::Bool(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ObservationTable – the loaded sheet
// ---------------------------------------------------------------------------

/// Row-major table: one row per site/observation, cells ordered like
/// `column_names`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    pub column_names: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ObservationTable {
    pub fn new(column_names: Vec<String>) -> Self {
        ObservationTable {
            column_names,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding short rows with `Missing` and truncating long ones.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.column_names.len(), CellValue::Missing);
        self.rows.push(row);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|c| c == name)
    }

    fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| Error::MissingColumn {
            column: name.to_string(),
        })
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<&CellValue>> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Read a column as floats. Missing cells become NaN; anything that
    /// does not parse as a number is an error.
    pub fn float_column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.require_column(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row_no, row)| {
                let cell = &row[idx];
                cell.as_f64().ok_or_else(|| Error::NonNumeric {
                    column: name.to_string(),
                    row: row_no,
                    value: cell.to_string(),
                })
            })
            .collect()
    }

    /// Set a column from `values`, replacing it if it already exists.
    /// `values` must have one entry per row.
    pub fn set_column(&mut self, name: &str, values: Vec<CellValue>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(Error::LengthMismatch {
                name: name.to_string(),
                len: values.len(),
                expected: self.rows.len(),
            });
        }
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.column_names.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }
}
