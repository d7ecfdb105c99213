//! Data Preparer - cleans a raw account table before training

use super::dataset::{Cell, Table};
use super::encoding::CategoryEncoding;
use super::error::DetectorResult;

/// Identifier column
pub const ID_COLUMN: &str = "id";

/// Label column, present only in training data
pub const TARGET_COLUMN: &str = "bot";

/// Free text and identifier columns with no predictive signal
pub const NOISY_COLUMNS: [&str; 10] = [
    "id_str",
    "screen_name",
    "location",
    "description",
    "url",
    "created_at",
    "lang",
    "status",
    "has_extended_profile",
    "name",
];

/// Cleaned table plus the identifier column copied before cleaning
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub table: Table,
    pub ids: Option<Vec<Cell>>,
}

/// Drop noisy columns and encode the categorical ones
pub fn prepare(mut table: Table, encoding: &CategoryEncoding) -> DetectorResult<PreparedData> {
    let ids = table.column(ID_COLUMN);

    let dropped = table.drop_columns(&NOISY_COLUMNS);
    if !dropped.is_empty() {
        tracing::debug!("Dropped non-predictive columns: {:?}", dropped);
    }

    encoding.apply_table(&mut table)?;

    Ok(PreparedData { table, ids })
}
