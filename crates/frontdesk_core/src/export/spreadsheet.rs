//! `.xlsx` export, single- and multi-sheet.
//!
//! # Invariants
//! - Sheet names are truncated to [`MAX_SHEET_NAME_CHARS`].
//! - A multi-sheet tab with no rows gets one placeholder row instead of
//!   an empty sheet.
//! - Sheet columns are the union of row keys in first-seen order.

use crate::export::delimited::stringify;
use crate::export::rows::{CellValue, ExportRow, SheetTab};
use crate::export::{export_path, ExportError, ExportResult};
use log::info;
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};

pub const XLSX_EXTENSION: &str = "xlsx";
/// Spreadsheet format ceiling for sheet names.
pub const MAX_SHEET_NAME_CHARS: usize = 31;
/// Sheet used by the single-sheet export.
pub const DATA_SHEET_NAME: &str = "Data";
pub const PLACEHOLDER_KEY: &str = "Info";
pub const PLACEHOLDER_VALUE: &str = "No data";

/// Fully resolved sheet contents, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetPlan {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetPlan {
    fn from_rows(name: &str, rows: &[ExportRow]) -> Self {
        let mut headers: Vec<String> = Vec::new();
        for row in rows {
            for key in row.keys() {
                if !headers.iter().any(|existing| existing == key) {
                    headers.push(key.to_string());
                }
            }
        }
        let rows = rows
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .map(|key| row.get(key).cloned().unwrap_or(CellValue::Empty))
                    .collect()
            })
            .collect();
        Self {
            name: sheet_name(name),
            headers,
            rows,
        }
    }
}

/// Truncates `name` to the sheet-name ceiling.
pub fn sheet_name(name: &str) -> String {
    name.chars().take(MAX_SHEET_NAME_CHARS).collect()
}

/// Plans one sheet per tab, substituting the "no data" row where needed.
pub fn plan_sheets(tabs: &[SheetTab]) -> Vec<SheetPlan> {
    tabs.iter()
        .map(|tab| {
            if tab.rows.is_empty() {
                let placeholder = [ExportRow::new().with(PLACEHOLDER_KEY, PLACEHOLDER_VALUE)];
                SheetPlan::from_rows(&tab.name, &placeholder)
            } else {
                SheetPlan::from_rows(&tab.name, &tab.rows)
            }
        })
        .collect()
}

/// Renders planned sheets into an `.xlsx` byte buffer.
pub fn render_workbook(plans: &[SheetPlan]) -> ExportResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    for plan in plans {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&plan.name)?;

        for (col, header) in plan.headers.iter().enumerate() {
            worksheet.write_string(0, column_index(col)?, header)?;
        }
        for (index, cells) in plan.rows.iter().enumerate() {
            let row = row_index(index + 1)?;
            for (col, cell) in cells.iter().enumerate() {
                let col = column_index(col)?;
                match cell {
                    CellValue::Empty => {}
                    CellValue::Integer(number) => {
                        worksheet.write_number(row, col, *number as f64)?;
                    }
                    CellValue::Text(_) | CellValue::Timestamp(_) => {
                        worksheet.write_string(row, col, stringify_cell(cell))?;
                    }
                }
            }
        }
    }
    Ok(workbook.save_to_buffer()?)
}

/// Writes `rows` as a single `Data` sheet. No file for an empty set.
pub fn write_rows_xlsx(base: &Path, rows: &[ExportRow]) -> ExportResult<Option<PathBuf>> {
    if rows.is_empty() {
        info!("event=export_xlsx module=export status=skipped reason=no_rows");
        return Ok(None);
    }
    let plan = SheetPlan::from_rows(DATA_SHEET_NAME, rows);
    let path = export_path(base, XLSX_EXTENSION);
    std::fs::write(&path, render_workbook(&[plan])?)?;
    info!(
        "event=export_xlsx module=export status=ok sheets=1 rows={} path={}",
        rows.len(),
        path.display()
    );
    Ok(Some(path))
}

/// Writes one sheet per tab. Always produces a file.
pub fn write_tabs_xlsx(base: &Path, tabs: &[SheetTab]) -> ExportResult<PathBuf> {
    let plans = plan_sheets(tabs);
    let path = export_path(base, XLSX_EXTENSION);
    std::fs::write(&path, render_workbook(&plans)?)?;
    info!(
        "event=export_xlsx module=export status=ok sheets={} path={}",
        plans.len(),
        path.display()
    );
    Ok(path)
}

// Spreadsheet cells keep text verbatim; delimiter substitution only
// applies to the delimited format.
fn stringify_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(text) => text.clone(),
        other => stringify(other),
    }
}

fn row_index(index: usize) -> ExportResult<u32> {
    u32::try_from(index).map_err(|_| ExportError::TooLarge(format!("row {index}")))
}

fn column_index(index: usize) -> ExportResult<u16> {
    u16::try_from(index).map_err(|_| ExportError::TooLarge(format!("column {index}")))
}

#[cfg(test)]
mod tests {
    use super::{
        plan_sheets, render_workbook, sheet_name, write_rows_xlsx, write_tabs_xlsx, SheetPlan,
        PLACEHOLDER_KEY, PLACEHOLDER_VALUE,
    };
    use crate::export::rows::{CellValue, ExportRow, SheetTab};

    #[test]
    fn sheet_names_are_truncated_to_31_chars() {
        let long = "Atendimentos por serviço solicitado no período";
        assert_eq!(sheet_name(long).chars().count(), 31);
        assert_eq!(sheet_name("By day"), "By day");
    }

    #[test]
    fn empty_tab_gets_placeholder_row() {
        let plans = plan_sheets(&[SheetTab::new("By service", Vec::new())]);
        assert_eq!(
            plans,
            vec![SheetPlan {
                name: "By service".to_string(),
                headers: vec![PLACEHOLDER_KEY.to_string()],
                rows: vec![vec![CellValue::Text(PLACEHOLDER_VALUE.to_string())]],
            }]
        );
    }

    #[test]
    fn headers_are_union_of_keys() {
        let plans = plan_sheets(&[SheetTab::new(
            "Mixed",
            vec![
                ExportRow::new().with("A", "1"),
                ExportRow::new().with("B", "2").with("A", "3"),
            ],
        )]);
        assert_eq!(plans[0].headers, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(plans[0].rows[0][1], CellValue::Empty);
    }

    #[test]
    fn rendered_workbook_is_a_zip_container() {
        let plans = plan_sheets(&[
            SheetTab::new("One", vec![ExportRow::new().with("Total", 3usize)]),
            SheetTab::new("Two", Vec::new()),
        ]);
        let bytes = render_workbook(&plans).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn single_sheet_export_skips_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        assert!(write_rows_xlsx(&dir.path().join("rows"), &[])
            .unwrap()
            .is_none());

        let path = write_rows_xlsx(
            &dir.path().join("rows"),
            &[ExportRow::new().with("Name", "Ana")],
        )
        .unwrap()
        .unwrap();
        assert_eq!(path, dir.path().join("rows.xlsx"));
        assert!(path.exists());
    }

    #[test]
    fn tab_export_always_writes_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tabs_xlsx(
            &dir.path().join("summary.xlsx"),
            &[SheetTab::new("Empty", Vec::new())],
        )
        .unwrap();
        assert_eq!(path, dir.path().join("summary.xlsx"));
        assert!(std::fs::metadata(path).unwrap().len() > 0);
    }
}
