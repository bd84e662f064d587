use crate::domain::model::Dataset;
use crate::utils::error::Result;
use rust_xlsxwriter::{Format, Workbook};

const SHEET_NAME: &str = "Data";

/// Serialize the dataset to xlsx bytes: one sheet, header row, data rows.
///
/// The account-number column is written with an explicit text number format
/// so spreadsheet readers do not strip the leading zeros of the 14-digit key.
pub fn write_workbook(dataset: &Dataset, account_column: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let text_format = Format::new().set_num_format("@");
    let account_idx = dataset.columns.iter().position(|c| c == account_column);

    for (col, name) in dataset.columns.iter().enumerate() {
        sheet.write_string(0, col as u16, name)?;
    }

    for (row, record) in dataset.rows.iter().enumerate() {
        let row = (row + 1) as u32;
        for (col, name) in dataset.columns.iter().enumerate() {
            let value = record.get(name);
            if account_idx == Some(col) {
                sheet.write_string_with_format(row, col as u16, value, &text_format)?;
            } else {
                sheet.write_string(row, col as u16, value)?;
            }
        }
    }

    let bytes = workbook.save_to_buffer()?;
    Ok(bytes)
}
