//! Reads the first worksheet of an Excel or OpenDocument workbook into the same
//! header/rows shape as [`crate::csv::parse_document`].

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use std::io::Cursor;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// True for `.xlsx`/`.ods` (zip container) and legacy `.xls` (OLE container) bytes.
pub fn is_workbook(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_owned(),
        // Register numbers and semesters typed into Excel come back as floats.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string().trim().to_owned(),
    }
}

/// Header (lowercased) and data rows of the first sheet. Rows with no text in
/// any cell are skipped. `Ok(None)` when the sheet is empty.
pub fn parse_first_sheet(
    bytes: &[u8],
) -> Result<Option<(Vec<String>, Vec<Vec<String>>)>, calamine::Error> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let Some(range) = workbook.worksheet_range_at(0).transpose()? else {
        return Ok(None);
    };

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|c| !c.is_empty()));

    let Some(header) = rows.next() else {
        return Ok(None);
    };
    let header = header.into_iter().map(|h| h.to_ascii_lowercase()).collect();
    Ok(Some((header, rows.collect())))
}
