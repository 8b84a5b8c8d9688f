use crate::extraction::DetailsRecord;

use super::schema::{BaseRow, CombinedRow};

/// Base columns followed by detail columns, in schema order.
pub fn merge(base: &BaseRow, details: &DetailsRecord) -> CombinedRow {
    let cells = base
        .values()
        .iter()
        .cloned()
        .chain(details.values().map(str::to_string))
        .collect();
    CombinedRow::from_cells(cells)
}

/// Row kept when a listing page could not be fetched: base preserved, details empty.
pub fn degraded(base: &BaseRow) -> CombinedRow {
    merge(base, &DetailsRecord::default())
}
