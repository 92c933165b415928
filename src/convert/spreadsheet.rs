//! Workbooks → HTML table fragment.
//!
//! `calamine`'s auto-detecting reader handles both OOXML (`.xlsx`) and the
//! legacy binary format (`.xls`) from the same byte buffer. Only the first
//! sheet **by position** is rendered; a multi-sheet preview is out of
//! place in a print flow where the user picks one document at a time.
//!
//! Cell values go through the shared escaper, so formulas and strings with
//! markup characters cannot break out of the fragment.

use super::html;
use crate::error::ConvertError;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use tracing::debug;

/// Render the first sheet of the workbook to `<table>` markup.
pub fn to_html(bytes: &[u8]) -> Result<String, ConvertError> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| ConvertError::Spreadsheet {
            detail: format!("not a readable workbook: {e}"),
        })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ConvertError::Spreadsheet {
            detail: "workbook has no sheets".to_string(),
        })?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ConvertError::Spreadsheet {
            detail: format!("sheet '{sheet_name}' is unreadable: {e}"),
        })?;

    let mut out = String::from("<table>");
    for row in range.rows() {
        out.push_str("<tr>");
        for cell in row {
            out.push_str("<td>");
            match cell {
                Data::Empty => {}
                other => html::escape_into(&mut out, &other.to_string()),
            }
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</table>");

    debug!(
        sheet = %sheet_name,
        rows = range.height(),
        cols = range.width(),
        "spreadsheet rendered"
    );
    Ok(out)
}
