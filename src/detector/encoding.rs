//! Category Encoding
//!
//! Maps the boolean-like profile columns to integer codes.
//!
//! Two modes:
//! - `Canonical`: `False` -> 0, `True` -> 1, any other token seen at training
//!   appended in sorted order. Fitted once at training, stored with the
//!   model and reused for every prediction.
//! - `PerCall`: a fresh label encoder is fitted on whatever values are
//!   present in each call. A lone `True` at prediction time then encodes to
//!   0, not 1. Kept for compatibility with models trained that way.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::dataset::{Cell, Table};
use super::error::{DetectorError, DetectorResult};

/// Boolean-like columns encoded to integers
pub const CATEGORICAL_COLUMNS: [&str; 3] = ["verified", "default_profile", "default_profile_image"];

const FALSE_TOKEN: &str = "False";
const TRUE_TOKEN: &str = "True";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingMode {
    #[default]
    Canonical,
    PerCall,
}

impl std::str::FromStr for EncodingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "canonical" => Ok(EncodingMode::Canonical),
            "per_call" | "per-call" | "percall" => Ok(EncodingMode::PerCall),
            other => Err(format!("unknown encoding mode '{}'", other)),
        }
    }
}

/// Normalized category token for a cell
pub fn category_token(cell: &Cell) -> String {
    match cell {
        Cell::Number(n) if *n == 0.0 => FALSE_TOKEN.to_string(),
        Cell::Number(n) if *n == 1.0 => TRUE_TOKEN.to_string(),
        Cell::Number(n) => n.to_string(),
        Cell::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" => TRUE_TOKEN.to_string(),
            "false" | "f" | "no" | "n" => FALSE_TOKEN.to_string(),
            _ => s.trim().to_string(),
        },
        Cell::Missing => String::new(),
    }
}

/// Label encoder over category tokens; a token's code is its position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Sorted distinct tokens of the given cells. Missing cells are skipped.
    pub fn fit<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Self {
        let mut classes: Vec<String> = cells
            .into_iter()
            .filter(|c| !c.is_missing())
            .map(category_token)
            .collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    /// `False`/`True` fixed at 0/1, other tokens appended sorted
    pub fn fit_canonical<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Self {
        let mut extra: Vec<String> = cells
            .into_iter()
            .filter(|c| !c.is_missing())
            .map(category_token)
            .filter(|t| t != FALSE_TOKEN && t != TRUE_TOKEN)
            .collect();
        extra.sort();
        extra.dedup();

        let mut classes = vec![FALSE_TOKEN.to_string(), TRUE_TOKEN.to_string()];
        classes.extend(extra);
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Code for `cell`. Missing cells stay missing and later count as zero.
    pub fn transform(&self, column: &str, cell: &Cell) -> DetectorResult<Cell> {
        if cell.is_missing() {
            return Ok(Cell::Missing);
        }
        let token = category_token(cell);
        self.classes
            .iter()
            .position(|c| *c == token)
            .map(|code| Cell::Number(code as f64))
            .ok_or_else(|| DetectorError::UnknownCategory {
                column: column.to_string(),
                value: token,
            })
    }
}

/// Encoding applied to the categorical columns, stored with the model
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryEncoding {
    pub mode: EncodingMode,
    /// Fitted encoders, empty in per-call mode
    #[serde(default)]
    pub encoders: BTreeMap<String, LabelEncoder>,
}

impl CategoryEncoding {
    /// Fit on a training table
    pub fn fit(mode: EncodingMode, table: &Table) -> Self {
        let mut encoders = BTreeMap::new();
        if mode == EncodingMode::Canonical {
            for column in CATEGORICAL_COLUMNS {
                if let Some(cells) = table.column(column) {
                    encoders.insert(column.to_string(), LabelEncoder::fit_canonical(&cells));
                }
            }
        }
        Self { mode, encoders }
    }

    /// Encode one column's cells
    pub fn encode_column(&self, column: &str, cells: &[Cell]) -> DetectorResult<Vec<Cell>> {
        let encoder = match self.mode {
            EncodingMode::PerCall => LabelEncoder::fit(cells),
            EncodingMode::Canonical => match self.encoders.get(column) {
                Some(encoder) => encoder.clone(),
                // Column absent at training; alignment will drop it.
                None => LabelEncoder::fit_canonical(cells),
            },
        };
        cells.iter().map(|c| encoder.transform(column, c)).collect()
    }

    /// Encode the categorical columns of a table in place
    pub fn apply_table(&self, table: &mut Table) -> DetectorResult<()> {
        for column in CATEGORICAL_COLUMNS {
            if let Some(cells) = table.column(column) {
                let encoded = self.encode_column(column, &cells)?;
                table.set_column(column, encoded);
            }
        }
        Ok(())
    }

    /// Encode the categorical columns of a single feature row in place
    pub fn apply_row(&self, row: &mut [(String, Cell)]) -> DetectorResult<()> {
        for (name, cell) in row.iter_mut() {
            if CATEGORICAL_COLUMNS.contains(&name.as_str()) {
                let encoded = self.encode_column(name, std::slice::from_ref(cell))?;
                if let Some(first) = encoded.into_iter().next() {
                    *cell = first;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_token_normalization() {
        assert_eq!(category_token(&text("TRUE")), "True");
        assert_eq!(category_token(&text("false")), "False");
        assert_eq!(category_token(&Cell::Number(1.0)), "True");
        assert_eq!(category_token(&Cell::Number(0.0)), "False");
        assert_eq!(category_token(&Cell::Missing), "");
        assert_eq!(category_token(&text("maybe")), "maybe");
    }

    #[test]
    fn test_label_encoder_sorts_values() {
        let cells = vec![text("True"), text("False"), text("True")];
        let enc = LabelEncoder::fit(&cells);
        assert_eq!(enc.classes(), &["False", "True"]);
        assert_eq!(enc.transform("verified", &text("True")).unwrap(), Cell::Number(1.0));
    }

    #[test]
    fn test_per_call_refit_shifts_codes() {
        // The same raw value encodes differently depending on what else is
        // present in the call.
        let encoding = CategoryEncoding::fit(EncodingMode::PerCall, &Table::default());

        let both = encoding
            .encode_column("verified", &[text("False"), text("True")])
            .unwrap();
        assert_eq!(both[1], Cell::Number(1.0));

        let alone = encoding.encode_column("verified", &[text("True")]).unwrap();
        assert_eq!(alone[0], Cell::Number(0.0));
    }

    #[test]
    fn test_canonical_codes_are_stable() {
        let table = Table::new(
            vec!["verified".to_string()],
            vec![vec![text("False")], vec![text("False")]],
        )
        .unwrap();
        let encoding = CategoryEncoding::fit(EncodingMode::Canonical, &table);

        let alone = encoding.encode_column("verified", &[text("True")]).unwrap();
        assert_eq!(alone[0], Cell::Number(1.0));

        let alone = encoding.encode_column("verified", &[text("false")]).unwrap();
        assert_eq!(alone[0], Cell::Number(0.0));
    }

    #[test]
    fn test_canonical_rejects_unseen_token() {
        let table = Table::new(vec!["verified".to_string()], vec![vec![text("True")]]).unwrap();
        let encoding = CategoryEncoding::fit(EncodingMode::Canonical, &table);

        let err = encoding.encode_column("verified", &[text("maybe")]).unwrap_err();
        assert!(matches!(err, DetectorError::UnknownCategory { .. }));
    }

    #[test]
    fn test_missing_cells_are_not_a_category() {
        let table = Table::new(
            vec!["verified".to_string()],
            vec![vec![text("True")], vec![Cell::Missing], vec![text("False")]],
        )
        .unwrap();
        let encoding = CategoryEncoding::fit(EncodingMode::Canonical, &table);
        assert_eq!(encoding.encoders["verified"].classes(), &["False", "True"]);

        let encoded = encoding
            .encode_column("verified", &[Cell::Missing, text("True")])
            .unwrap();
        assert_eq!(encoded, vec![Cell::Missing, Cell::Number(1.0)]);

        let per_call = LabelEncoder::fit(&[Cell::Missing, text("True")]);
        assert_eq!(per_call.classes(), &["True"]);
        assert_eq!(per_call.transform("verified", &Cell::Missing).unwrap(), Cell::Missing);
    }

    #[test]
    fn test_apply_row_only_touches_categorical_columns() {
        let encoding = CategoryEncoding::default();
        let mut row = vec![
            ("verified".to_string(), text("True")),
            ("followers_count".to_string(), Cell::Number(10.0)),
        ];
        encoding.apply_row(&mut row).unwrap();
        assert_eq!(row[0].1, Cell::Number(1.0));
        assert_eq!(row[1].1, Cell::Number(10.0));
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("per_call".parse::<EncodingMode>().unwrap(), EncodingMode::PerCall);
        assert_eq!("Canonical".parse::<EncodingMode>().unwrap(), EncodingMode::Canonical);
        assert!("other".parse::<EncodingMode>().is_err());
    }
}
