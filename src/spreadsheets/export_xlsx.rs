use crate::domain::board::SiteBoard;
use crate::domain::site::{SiteRecord, COLUMN_HEADERS};
use crate::errors::ServerError;
use rust_xlsxwriter::{Workbook, Worksheet};

/// Serializes the whole board into a three-sheet workbook, one sheet per
/// stage, one row per record, columns in the canonical field order.
pub fn export_board_xlsx(board: &SiteBoard) -> Result<Vec<u8>, ServerError> {
    let mut workbook = Workbook::new();

    write_sheet(&mut workbook, "Ongoing Sites", &board.ongoing)?;
    write_sheet(&mut workbook, "Soak Completed Sites", &board.soak)?;
    write_sheet(&mut workbook, "Cancelled Sites", &board.cancelled)?;

    workbook
        .save_to_buffer()
        .map_err(|e| ServerError::XlsxError(format!("Failed to save workbook: {e}")))
}

fn write_sheet(
    workbook: &mut Workbook,
    name: &str,
    records: &[SiteRecord],
) -> Result<(), ServerError> {
    let worksheet: &mut Worksheet = workbook.add_worksheet();
    worksheet
        .set_name(name)
        .map_err(|e| ServerError::XlsxError(format!("Failed to name sheet '{name}': {e}")))?;

    for (col, header) in COLUMN_HEADERS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(|e| {
                ServerError::XlsxError(format!("Failed to write header '{header}': {e}"))
            })?;
    }

    for (i, record) in records.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, value) in record.column_values().iter().enumerate() {
            worksheet.write_string(r, col as u16, value).map_err(|e| {
                ServerError::XlsxError(format!("Failed to write row {r} of '{name}': {e}"))
            })?;
        }
    }

    Ok(())
}
