use std::collections::BTreeSet;
use std::path::Path;
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{CellValue, ObservationTable};
use crate::error::{Error, Result};

/// Tokens read as missing unless `keep_default_na` is switched off.
pub const DEFAULT_NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// How to turn a file into an [`ObservationTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Sheet to read. Ignored for CSV and Parquet.
    pub sheet: String,
    /// 0-based row holding the column names; rows above it are skipped.
    pub header_row: usize,
    /// Keep only these columns, in this order.
    pub columns: Option<Vec<String>>,
    /// Extra cell texts that mean "missing".
    pub na_values: Vec<String>,
    pub keep_default_na: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            sheet: "combined".to_string(),
            header_row: 0,
            columns: None,
            na_values: vec!["NA".to_string(), "missing".to_string()],
            keep_default_na: true,
        }
    }
}

impl LoadOptions {
    fn missing_tokens(&self) -> BTreeSet<&str> {
        let mut tokens: BTreeSet<&str> = self.na_values.iter().map(String::as_str).collect();
        if self.keep_default_na {
            tokens.extend(DEFAULT_NA_VALUES.iter().copied());
        }
        tokens
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an observation table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – the named sheet
/// * `.csv`     – plain comma-separated table
/// * `.parquet` – flat columns; numeric types read as numbers, others as text
///
/// The file is opened read-only and closed before returning.
pub fn load_table(path: &Path, opts: &LoadOptions) -> Result<ObservationTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_spreadsheet(path, opts)?,
        "csv" => load_csv(path, opts)?,
        "parquet" | "pq" => load_parquet(path, opts)?,
        other => return Err(Error::UnsupportedFormat(other.to_string())),
    };
    log::info!(
        "loaded {} rows x {} columns from {}",
        table.len(),
        table.column_names.len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Header handling shared by every format
// ---------------------------------------------------------------------------

/// Blank headers become `Unnamed: <i>`, repeated ones get `.1`, `.2`, ...
fn header_names(raw: Vec<String>) -> Vec<String> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, name)| {
            let base = if name.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                name
            };
            let mut candidate = base.clone();
            let mut n = 1;
            while seen.contains(&candidate) {
                candidate = format!("{base}.{n}");
                n += 1;
            }
            seen.insert(candidate.clone());
            candidate
        })
        .collect()
}

/// Build the table from a header and its data rows, then apply the column subset.
fn assemble(
    header: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    columns: Option<&[String]>,
) -> Result<ObservationTable> {
    let mut full = ObservationTable::new(header_names(header));
    for row in rows {
        full.push_row(row);
    }

    let Some(wanted) = columns else {
        return Ok(full);
    };

    let indices = wanted
        .iter()
        .map(|name| {
            full.column_index(name).ok_or_else(|| Error::MissingColumn {
                column: name.clone(),
            })
        })
        .collect::<Result<Vec<usize>>>()?;

    let mut subset = ObservationTable::new(wanted.to_vec());
    for row in full.rows {
        subset.push_row(indices.iter().map(|&i| row[i].clone()).collect());
    }
    Ok(subset)
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

fn load_spreadsheet(path: &Path, opts: &LoadOptions) -> Result<ObservationTable> {
    let mut workbook = open_workbook_auto(path)?;

    let available = workbook.sheet_names();
    if !available.iter().any(|name| name == &opts.sheet) {
        return Err(Error::SheetNotFound {
            sheet: opts.sheet.clone(),
            available,
        });
    }

    let range = workbook.worksheet_range(&opts.sheet)?;
    let na = opts.missing_tokens();

    // The range starts at the first used cell; shift it back to sheet coordinates.
    let (first_row, first_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));
    let total_rows = first_row + range.height();

    if opts.header_row >= total_rows {
        return Err(Error::HeaderRowOutOfRange {
            row: opts.header_row,
            rows: total_rows,
        });
    }

    let mut header = Vec::new();
    let mut rows = Vec::new();
    for (offset, cells) in range.rows().enumerate() {
        let sheet_row = first_row + offset;
        if sheet_row < opts.header_row {
            continue;
        }
        if sheet_row == opts.header_row {
            header = std::iter::repeat(String::new())
                .take(first_col)
                .chain(cells.iter().map(header_text))
                .collect();
            continue;
        }
        rows.push(
            std::iter::repeat(CellValue::Missing)
                .take(first_col)
                .chain(cells.iter().map(|c| data_to_cell(c, &na)))
                .collect(),
        );
    }
    // Header row above the used range: all names blank.
    if header.is_empty() {
        header = vec![String::new(); first_col + range.width()];
    }

    assemble(header, rows, opts.columns.as_deref())
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn data_to_cell(cell: &Data, na: &BTreeSet<&str>) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Missing,
        Data::String(s) if na.contains(s.as_str()) => CellValue::Missing,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(v) => CellValue::Float(*v),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: the header sits on `header_row`, data follows it.
/// Every field is text; numbers and booleans are inferred per cell.
fn load_csv(path: &Path, opts: &LoadOptions) -> Result<ObservationTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let na = opts.missing_tokens();

    let mut header: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    let mut lines = 0;
    for (line_no, result) in reader.records().enumerate() {
        let record = result?;
        lines += 1;
        if line_no < opts.header_row {
            continue;
        }
        if header.is_none() {
            header = Some(record.iter().map(str::to_string).collect());
            continue;
        }
        rows.push(record.iter().map(|field| infer_cell(field, &na)).collect());
    }

    let header = header.ok_or(Error::HeaderRowOutOfRange {
        row: opts.header_row,
        rows: lines,
    })?;
    assemble(header, rows, opts.columns.as_deref())
}

fn infer_cell(s: &str, na: &BTreeSet<&str>) -> CellValue {
    if na.contains(s) {
        return CellValue::Missing;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    match s {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::Text(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns. Nulls become missing cells.
/// Header row and NA tokens do not apply; the column subset does.
fn load_parquet(path: &Path, opts: &LoadOptions) -> Result<ObservationTable> {
    let file = std::fs::File::open(path).map_err(|e| Error::io(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let header: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let columns = batch
            .columns()
            .iter()
            .map(column_cells)
            .collect::<Result<Vec<Vec<CellValue>>>>()?;
        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|col| col[row].clone()).collect());
        }
    }

    assemble(header, rows, opts.columns.as_deref())
}

/// Convert one Arrow column to cells.
///
/// Signed integers stay integers; unsigned, floating and decimal columns
/// are cast to `f64`; strings and booleans map directly. Anything else
/// (dates, timestamps, ...) is rendered as text, one value per cell.
fn column_cells(col: &ArrayRef) -> Result<Vec<CellValue>> {
    let data_type = col.data_type();
    let cells = if data_type.is_signed_integer() {
        let ints = cast(col.as_ref(), &DataType::Int64)?;
        ints.as_primitive::<Int64Type>()
            .iter()
            .map(|v| v.map_or(CellValue::Missing, CellValue::Integer))
            .collect()
    } else if data_type.is_unsigned_integer()
        || data_type.is_floating()
        || matches!(data_type, DataType::Decimal128(..) | DataType::Decimal256(..))
    {
        let floats = cast(col.as_ref(), &DataType::Float64)?;
        floats
            .as_primitive::<Float64Type>()
            .iter()
            .map(|v| v.map_or(CellValue::Missing, CellValue::Float))
            .collect()
    } else {
        match data_type {
            DataType::Utf8 => text_cells(col.as_string::<i32>().iter()),
            DataType::LargeUtf8 => text_cells(col.as_string::<i64>().iter()),
            DataType::Boolean => col
                .as_boolean()
                .iter()
                .map(|v| v.map_or(CellValue::Missing, CellValue::Bool))
                .collect(),
            _ => {
                let formatter = ArrayFormatter::try_new(col.as_ref(), &FormatOptions::default())?;
                (0..col.len())
                    .map(|i| {
                        if col.is_null(i) {
                            CellValue::Missing
                        } else {
                            CellValue::Text(formatter.value(i).to_string())
                        }
                    })
                    .collect()
            }
        }
    };
    Ok(cells)
}

fn text_cells<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<CellValue> {
    values
        .map(|v| v.map_or(CellValue::Missing, |s| CellValue::Text(s.to_string())))
        .collect()
}
