use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the uploaded table. Cells are kept as text; the column order
/// lives on the owning [`Dataset`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    pub cells: HashMap<String, String>,
}

impl Record {
    pub fn get(&self, column: &str) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        self.cells.insert(column.to_string(), value.into());
    }
}

/// Ordered rows sharing a common column set. Created on upload, mutated
/// column-by-column during resolution, discarded after export.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl Dataset {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Appends the column (with empty cells) if it is not already present.
    pub fn ensure_column(&mut self, name: &str) {
        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
    }
}

/// Canonical 14-character form of an account number.
///
/// Derivation mirrors the billing site's expectations: parse the raw cell as
/// a float, truncate to an integer, render its digits and left-pad with `'0'`
/// to width 14. Anything unparseable, or whose rendering does not pad to
/// exactly 14 characters, is unresolvable. Zero and negative values are not
/// rejected beyond that length check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountKey(String);

impl AccountKey {
    pub fn normalize(raw: &str) -> Option<Self> {
        let value: f64 = raw.trim().parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        let digits = (value.trunc() as i128).to_string();
        let padded = format!("{:0>14}", digits);
        if padded.len() != 14 {
            return None;
        }
        Some(Self(padded))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of one per-row lookup, written straight into the target cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    CustomerId(String),
    Empty,
    Error,
}

impl ResolutionResult {
    /// Cell value to store: the customer ID, `""`, or the `ERROR` sentinel.
    pub fn as_cell(&self) -> &str {
        match self {
            ResolutionResult::CustomerId(id) => id,
            ResolutionResult::Empty => "",
            ResolutionResult::Error => "ERROR",
        }
    }
}

/// Mutated dataset plus per-outcome counters for batch logging.
#[derive(Debug, Clone)]
pub struct ResolveSummary {
    pub dataset: Dataset,
    pub resolved: usize,
    pub empty: usize,
    pub errors: usize,
    pub invalid: usize,
}

/// Finished export, held by the session until the next upload.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub const XLSX_CONTENT_TYPE: &'static str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

    pub fn xlsx(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: Self::XLSX_CONTENT_TYPE.to_string(),
            bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_keeps_fourteen_digit_input() {
        let key = AccountKey::normalize("12345678901234").unwrap();
        assert_eq!(key.as_str(), "12345678901234");
    }

    #[test]
    fn normalize_pads_short_numbers() {
        let key = AccountKey::normalize("123.0").unwrap();
        assert_eq!(key.as_str(), "00000000000123");
    }

    #[test]
    fn normalize_truncates_fractions() {
        let key = AccountKey::normalize("123.9").unwrap();
        assert_eq!(key.as_str(), "00000000000123");
    }

    #[test]
    fn normalize_strips_surrounding_whitespace() {
        let key = AccountKey::normalize("  42  ").unwrap();
        assert_eq!(key.as_str(), "00000000000042");
    }

    #[test]
    fn normalize_rejects_text() {
        assert_eq!(AccountKey::normalize("abc"), None);
        assert_eq!(AccountKey::normalize(""), None);
        assert_eq!(AccountKey::normalize("12-34"), None);
    }

    #[test]
    fn normalize_rejects_more_than_fourteen_digits() {
        assert_eq!(AccountKey::normalize("123456789012345"), None);
    }

    #[test]
    fn normalize_rejects_nan_and_infinity() {
        assert_eq!(AccountKey::normalize("NaN"), None);
        assert_eq!(AccountKey::normalize("inf"), None);
    }

    #[test]
    fn normalize_round_trips_integer_value() {
        let key = AccountKey::normalize("987654").unwrap();
        assert_eq!(key.as_str().parse::<i64>().unwrap(), 987654);
    }

    // Observed behavior, not a contract: a negative value pads to 14 chars
    // with an embedded sign and is submitted as-is.
    #[test]
    fn normalize_passes_negative_values_through() {
        let key = AccountKey::normalize("-123").unwrap();
        assert_eq!(key.as_str(), "0000000000-123");
        assert_eq!(key.as_str().len(), 14);
    }

    #[test]
    fn resolution_result_cell_values() {
        assert_eq!(
            ResolutionResult::CustomerId("CUST-9".into()).as_cell(),
            "CUST-9"
        );
        assert_eq!(ResolutionResult::Empty.as_cell(), "");
        assert_eq!(ResolutionResult::Error.as_cell(), "ERROR");
    }

    #[test]
    fn ensure_column_appends_once() {
        let mut dataset = Dataset::new(vec!["Account Number".into()]);
        dataset.ensure_column("Customer ID");
        dataset.ensure_column("Customer ID");
        assert_eq!(dataset.columns, vec!["Account Number", "Customer ID"]);
    }
}
