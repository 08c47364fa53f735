//! Export pipeline for filtered records and summary tables.
//!
//! # Responsibility
//! - Project records and aggregates into flat rows.
//! - Serialize rows to semicolon-delimited text or `.xlsx`.
//!
//! # Invariants
//! - Exporters never touch the store; they serialize resident data only.
//! - Output paths are the caller's base name plus the format extension,
//!   appended only when absent.

use std::error::Error;
use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub mod delimited;
pub mod rows;
pub mod spreadsheet;

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Xlsx(rust_xlsxwriter::XlsxError),
    /// Data exceeds spreadsheet grid limits.
    TooLarge(String),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to write export file: {err}"),
            Self::Xlsx(err) => write!(f, "failed to build spreadsheet: {err}"),
            Self::TooLarge(what) => write!(f, "export exceeds spreadsheet limits at {what}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Xlsx(err) => Some(err),
            Self::TooLarge(_) => None,
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(value: rust_xlsxwriter::XlsxError) -> Self {
        Self::Xlsx(value)
    }
}

/// `base` with `.<extension>` appended unless it already ends with it.
pub fn export_path(base: &Path, extension: &str) -> PathBuf {
    let suffix = format!(".{extension}");
    if base.to_string_lossy().ends_with(&suffix) {
        return base.to_path_buf();
    }
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::export_path;
    use std::path::{Path, PathBuf};

    #[test]
    fn extension_is_appended_only_when_absent() {
        assert_eq!(
            export_path(Path::new("out/summary_2024-01-01_2024-01-31"), "xlsx"),
            PathBuf::from("out/summary_2024-01-01_2024-01-31.xlsx")
        );
        assert_eq!(
            export_path(Path::new("requests.csv"), "csv"),
            PathBuf::from("requests.csv")
        );
        assert_eq!(
            export_path(Path::new("requests.csv"), "xlsx"),
            PathBuf::from("requests.csv.xlsx")
        );
    }
}
