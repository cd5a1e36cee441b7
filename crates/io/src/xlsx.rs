// Excel import as rows of text cells, and single-sheet table export

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::Timelike;
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet};
use zippkg_core::cell_address;

use crate::error::IoError;

/// Read one sheet (xlsx, xls, xlsb, ods) as rows of text cells.
///
/// Row and column positions are absolute: if the used range starts below or
/// right of A1, the leading rows/cells are filled with blanks.
pub fn read_sheet_rows(path: &Path, sheet_name: &str) -> Result<Vec<Vec<String>>, IoError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| IoError::SpreadsheetOpen {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let sheet_names = workbook.sheet_names();
    if !sheet_names.iter().any(|n| n == sheet_name) {
        return Err(IoError::SpreadsheetRead {
            path: path.to_path_buf(),
            sheet: sheet_name.to_string(),
            message: format!("no such sheet (found: {})", sheet_names.join(", ")),
        });
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| IoError::SpreadsheetRead {
            path: path.to_path_buf(),
            sheet: sheet_name.to_string(),
            message: e.to_string(),
        })?;

    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<String>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![String::new(); start_col as usize];
        cells.extend(row.iter().map(cell_text));
        rows.push(cells);
    }

    log::debug!("read {} rows from '{}' in {}", rows.len(), sheet_name, path.display());
    Ok(rows)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(n) => {
            // Integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) if ndt.num_seconds_from_midnight() == 0 => ndt.format("%Y-%m-%d").to_string(),
            Some(ndt) => ndt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => format!("{}", dt.as_f64()),
        },
    }
}

/// Write a single sheet: a bold header row, then one row per entry.
/// Empty strings leave the cell blank.
pub fn export_table(
    path: &Path,
    sheet_name: &str,
    header: &[String],
    rows: &[Vec<String>],
) -> Result<(), IoError> {
    let write_err = |message: String| IoError::SpreadsheetWrite {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = XlsxWorkbook::new();
    let bold = Format::new().set_bold();

    let worksheet = workbook
        .add_worksheet()
        .set_name(sheet_name)
        .map_err(|e| write_err(format!("Failed to create sheet '{}': {}", sheet_name, e)))?;

    for (col, name) in header.iter().enumerate() {
        write_cell(worksheet, 0, col, name, Some(&bold)).map_err(write_err)?;
    }
    for (row_idx, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            write_cell(worksheet, row_idx + 1, col, value, None).map_err(write_err)?;
        }
    }

    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| write_err(format!("Failed to freeze header row: {}", e)))?;

    workbook
        .save(path)
        .map_err(|e| write_err(format!("Failed to save XLSX file: {}", e)))?;
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: usize,
    col: usize,
    value: &str,
    format: Option<&Format>,
) -> Result<(), String> {
    let addr = cell_address(row, col);
    let (r, c) = match (u32::try_from(row), u16::try_from(col)) {
        (Ok(r), Ok(c)) => (r, c),
        _ => return Err(format!("cell {addr} is outside the sheet")),
    };
    let written = match format {
        Some(format) => worksheet.write_string_with_format(r, c, value, format),
        None => worksheet.write_string(r, c, value),
    };
    written
        .map(|_| ())
        .map_err(|e| format!("Failed to write cell {addr}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::ExcelDateTime;
    use tempfile::TempDir;

    #[test]
    fn read_mixed_cells() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input.xlsx");

        let mut wb = XlsxWorkbook::new();
        let ws = wb.add_worksheet().set_name("Sheet1").unwrap();
        ws.write_string(0, 0, "RefID").unwrap();
        ws.write_string(0, 1, "FileName").unwrap();
        ws.write_string(0, 2, "Pages").unwrap();
        ws.write_string(0, 3, "[IssueInfo]IssueDate").unwrap();
        ws.write_string(0, 4, "Flag").unwrap();
        ws.write_number(1, 0, 42.0).unwrap();
        ws.write_string(1, 1, "a.pdf").unwrap();
        ws.write_number(1, 2, 2.5).unwrap();
        let date = ExcelDateTime::from_ymd(2020, 1, 1).unwrap();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        ws.write_datetime_with_format(1, 3, &date, &date_format).unwrap();
        ws.write_boolean(1, 4, true).unwrap();
        wb.save(&path).unwrap();

        let rows = read_sheet_rows(&path, "Sheet1").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], ["RefID", "FileName", "Pages", "[IssueInfo]IssueDate", "Flag"]);
        assert_eq!(rows[1], ["42", "a.pdf", "2.5", "2020-01-01", "TRUE"]);
    }

    #[test]
    fn offset_range_keeps_absolute_positions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("offset.xlsx");

        let mut wb = XlsxWorkbook::new();
        let ws = wb.add_worksheet().set_name("Data").unwrap();
        ws.write_string(2, 1, "FileName").unwrap();
        ws.write_string(3, 1, "a.pdf").unwrap();
        wb.save(&path).unwrap();

        let rows = read_sheet_rows(&path, "Data").unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].is_empty());
        assert_eq!(rows[2], ["", "FileName"]);
        assert_eq!(rows[3][1], "a.pdf");
    }

    #[test]
    fn missing_sheet_and_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("one.xlsx");
        let mut wb = XlsxWorkbook::new();
        wb.add_worksheet().set_name("Only").unwrap();
        wb.save(&path).unwrap();

        let err = read_sheet_rows(&path, "Sheet1").unwrap_err();
        assert!(matches!(err, IoError::SpreadsheetRead { .. }), "{err}");
        assert!(err.to_string().contains("Only"));

        let err = read_sheet_rows(&dir.path().join("absent.xlsx"), "Sheet1").unwrap_err();
        assert!(matches!(err, IoError::SpreadsheetOpen { .. }), "{err}");
    }

    #[test]
    fn export_then_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.xlsx");
        let header = vec!["FileName".to_string(), "Report Status".to_string()];
        let rows = vec![
            vec!["a.pdf".to_string(), "Succeeded".to_string()],
            vec![String::new(), "Failed".to_string()],
            vec!["c.pdf".to_string(), String::new()],
        ];
        export_table(&path, "Reconcile", &header, &rows).unwrap();

        let back = read_sheet_rows(&path, "Reconcile").unwrap();
        assert_eq!(back.len(), 4);
        assert_eq!(back[0], header);
        assert_eq!(back[2], ["", "Failed"]);
        assert_eq!(back[3], ["c.pdf", ""]);
    }
}
