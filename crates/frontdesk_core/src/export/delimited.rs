//! Semicolon-delimited text export.
//!
//! No quoting scheme: embedded newlines become spaces and embedded `;`
//! become `,` so the delimiter grid stays intact.

use crate::export::rows::{CellValue, ExportRow};
use crate::export::{export_path, ExportResult};
use chrono::SecondsFormat;
use log::info;
use std::path::{Path, PathBuf};

pub const DELIMITER: char = ';';
pub const CSV_EXTENSION: &str = "csv";

/// Serializes `rows` with the first row's keys as header.
///
/// Returns `None` for an empty row set.
pub fn to_delimited(rows: &[ExportRow]) -> Option<String> {
    let first = rows.first()?;
    let header: Vec<&str> = first.keys().collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        header
            .iter()
            .map(|key| clean_text(key))
            .collect::<Vec<_>>()
            .join(&DELIMITER.to_string()),
    );
    for row in rows {
        let line = header
            .iter()
            .map(|key| row.get(key).map(stringify).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(&DELIMITER.to_string());
        lines.push(line);
    }
    Some(lines.join("\n"))
}

/// Writes `rows` to `<base>.csv`. No file is produced for an empty set.
pub fn write_delimited(base: &Path, rows: &[ExportRow]) -> ExportResult<Option<PathBuf>> {
    let Some(text) = to_delimited(rows) else {
        info!("event=export_csv module=export status=skipped reason=no_rows");
        return Ok(None);
    };
    let path = export_path(base, CSV_EXTENSION);
    std::fs::write(&path, text)?;
    info!(
        "event=export_csv module=export status=ok rows={} path={}",
        rows.len(),
        path.display()
    );
    Ok(Some(path))
}

/// Text form of one cell.
pub fn stringify(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Timestamp(at) => at.to_rfc3339_opts(SecondsFormat::Millis, true),
        CellValue::Integer(number) => number.to_string(),
        CellValue::Text(text) => clean_text(text),
    }
}

/// Flattens newlines and swaps the delimiter for `,`.
fn clean_text(text: &str) -> String {
    text.replace('\n', " ").replace(DELIMITER, ",")
}

#[cfg(test)]
mod tests {
    use super::{stringify, to_delimited, write_delimited};
    use crate::export::rows::{CellValue, ExportRow};
    use chrono::{TimeZone, Utc};

    #[test]
    fn header_and_rows_are_semicolon_joined() {
        let rows = vec![
            ExportRow::new().with("Day", "2024-01-01").with("Total", 2usize),
            ExportRow::new().with("Day", "2024-01-02").with("Total", 1usize),
        ];
        assert_eq!(
            to_delimited(&rows).unwrap(),
            "Day;Total\n2024-01-01;2\n2024-01-02;1"
        );
    }

    #[test]
    fn values_cannot_break_the_grid() {
        let rows = vec![ExportRow::new()
            .with("Name", "Silva; Maria\nda")
            .with("Note", CellValue::Empty)];
        let text = to_delimited(&rows).unwrap();
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "Silva, Maria da;");
        assert_eq!(lines[1].split(';').count(), 2);
    }

    #[test]
    fn header_keys_cannot_break_the_grid() {
        let rows = vec![ExportRow::new()
            .with("Day;Week", "2024-01-01")
            .with("Total\ncount", 3usize)];
        let text = to_delimited(&rows).unwrap();
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines, ["Day,Week;Total count", "2024-01-01;3"]);
    }

    #[test]
    fn timestamps_render_as_iso_8601() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(
            stringify(&CellValue::Timestamp(at)),
            "2024-01-01T12:00:00.000Z"
        );
    }

    #[test]
    fn missing_keys_render_empty() {
        let rows = vec![
            ExportRow::new().with("A", "1").with("B", "2"),
            ExportRow::new().with("A", "3"),
        ];
        assert_eq!(to_delimited(&rows).unwrap(), "A;B\n1;2\n3;");
    }

    #[test]
    fn resplitting_recovers_the_grid_shape() {
        let rows: Vec<ExportRow> = (0..12usize)
            .map(|i| {
                ExportRow::new()
                    .with("Index", i)
                    .with("Text", format!("row;{i}\nline"))
                    .with("Blank", CellValue::Empty)
            })
            .collect();
        let text = to_delimited(&rows).unwrap();
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), rows.len() + 1);
        assert!(lines.iter().all(|line| line.split(';').count() == 3));
    }

    #[test]
    fn empty_rows_produce_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("requests_2024-01-01_2024-01-31");
        assert!(to_delimited(&[]).is_none());
        assert!(write_delimited(&base, &[]).unwrap().is_none());
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn write_appends_extension_once() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![ExportRow::new().with("A", "1")];

        let written = write_delimited(&dir.path().join("report"), &rows)
            .unwrap()
            .unwrap();
        assert_eq!(written, dir.path().join("report.csv"));

        let written = write_delimited(&dir.path().join("other.csv"), &rows)
            .unwrap()
            .unwrap();
        assert_eq!(written, dir.path().join("other.csv"));
        assert_eq!(std::fs::read_to_string(written).unwrap(), "A\n1");
    }
}
