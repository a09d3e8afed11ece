use super::model::ObservationTable;

// ---------------------------------------------------------------------------
// Row filter: drop rows with no data at all
// ---------------------------------------------------------------------------

/// Remove every row whose cells are all missing. Rows with at least one
/// present cell are kept unchanged and in order.
///
/// Idempotent: a second pass finds nothing left to drop.
pub fn drop_empty_rows(mut table: ObservationTable) -> ObservationTable {
    let before = table.len();
    table
        .rows
        .retain(|row| !row.iter().all(|cell| cell.is_missing()));
    let dropped = before - table.len();
    log::info!("dropped {dropped} empty rows, {} remain", table.len());
    table
}
