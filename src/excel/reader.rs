use crate::domain::model::{Dataset, Record};
use crate::utils::error::{ResolverError, Result};
use calamine::{Data, Reader, Xlsx};
use regex::Regex;
use std::io::Cursor;

/// Parse an uploaded workbook (first sheet) into a [`Dataset`].
///
/// Column names are cleaned (runs of whitespace collapsed, trimmed) and every
/// cell is coerced to text; empty and error cells become `""`. A workbook
/// that cannot be opened aborts the whole batch.
pub fn read_workbook(bytes: &[u8]) -> Result<Dataset> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook: Xlsx<_> = Xlsx::new(cursor)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ResolverError::processing("workbook has no sheets"))?;

    let range = workbook.worksheet_range(&sheet_name)?;
    let whitespace = Regex::new(r"\s+")
        .map_err(|e| ResolverError::processing(format!("header regex: {}", e)))?;
    let mut rows = range.rows();

    let header_row = rows
        .next()
        .ok_or_else(|| ResolverError::processing(format!("sheet '{}' is empty", sheet_name)))?;

    // Columns with a blank header carry no addressable data; skip them.
    let headers: Vec<(usize, String)> = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| (idx, clean_header(&whitespace, &cell_to_string(cell))))
        .filter(|(_, name)| !name.is_empty())
        .collect();

    if headers.is_empty() {
        return Err(ResolverError::processing(format!(
            "sheet '{}' has no column headers",
            sheet_name
        )));
    }

    let mut dataset = Dataset::new(headers.iter().map(|(_, name)| name.clone()).collect());

    for row in rows {
        let mut record = Record::default();
        for (idx, name) in &headers {
            let value = row.get(*idx).map(cell_to_string).unwrap_or_default();
            record.set(name, value);
        }
        dataset.rows.push(record);
    }

    tracing::debug!(
        "Parsed sheet '{}': {} columns, {} rows",
        sheet_name,
        dataset.columns.len(),
        dataset.rows.len()
    );

    Ok(dataset)
}

fn clean_header(whitespace: &Regex, raw: &str) -> String {
    whitespace.replace_all(raw, " ").trim().to_string()
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            // Whole-number floats render without the trailing ".0" so account
            // numbers survive Excel's numeric storage.
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}
