use super::model::{CellValue, ObservationTable};
use crate::error::Result;

/// Name of the derived column.
pub const RESPONSE_RATIO: &str = "soc_rr";

/// `ln(elevated / ambient)`, or NaN unless both are positive and finite.
pub fn response_ratio(elevated: f64, ambient: f64) -> f64 {
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if usable(elevated) && usable(ambient) {
        (elevated / ambient).ln()
    } else {
        f64::NAN
    }
}

/// Append the `soc_rr` column computed from the two SOC columns.
///
/// The source columns are read, never written. A missing source column is
/// fatal; a bad operand only makes that row's ratio NaN.
pub fn append_response_ratio(
    mut table: ObservationTable,
    elevated_column: &str,
    ambient_column: &str,
) -> Result<ObservationTable> {
    let elevated = table.float_column(elevated_column)?;
    let ambient = table.float_column(ambient_column)?;

    let ratios: Vec<f64> = elevated
        .iter()
        .zip(&ambient)
        .map(|(&e, &a)| response_ratio(e, a))
        .collect();
    let undefined = ratios.iter().filter(|r| r.is_nan()).count();
    log::info!(
        "derived {RESPONSE_RATIO} for {} rows ({undefined} undefined)",
        ratios.len()
    );

    table.set_column(
        RESPONSE_RATIO,
        ratios.into_iter().map(CellValue::Float).collect(),
    )?;
    Ok(table)
}
