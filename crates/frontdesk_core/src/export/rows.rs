//! Flat key/value rows fed to the exporters.
//!
//! # Invariants
//! - Column order is the insertion order of the first row's keys.
//! - The raw request projection carries both the raw and the masked
//!   national ID; every other surface shows the masked form only.

use crate::model::request::ServiceRequest;
use crate::report::aggregate::ReportSummary;
use chrono::{DateTime, Local, TimeZone, Utc};

pub const COL_DATE: &str = "Date";
pub const COL_NAME: &str = "Name";
pub const COL_NATIONAL_ID: &str = "National ID";
pub const COL_NATIONAL_ID_MASKED: &str = "National ID (masked)";
pub const COL_SERVICE: &str = "Service";
pub const COL_TIME: &str = "Time";
pub const COL_DAY: &str = "Day";
pub const COL_HOUR: &str = "Hour";
pub const COL_TOTAL: &str = "Total";

pub const SHEET_BY_DAY: &str = "By day";
pub const SHEET_BY_HOUR: &str = "By hour";
pub const SHEET_BY_SERVICE: &str = "By service";

/// One exported cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Integer(i64),
    Timestamp(DateTime<Utc>),
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<usize> for CellValue {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Text(value.to_string()), Self::Integer)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// Ordered key/value record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportRow {
    cells: Vec<(String, CellValue)>,
}

impl ExportRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.cells.push((key.into(), value.into()));
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(key, _)| key.as_str())
    }

    /// Value of the first column named `key`.
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Named sheet for multi-sheet export.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTab {
    pub name: String,
    pub rows: Vec<ExportRow>,
}

impl SheetTab {
    pub fn new(name: impl Into<String>, rows: Vec<ExportRow>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// Raw-record projection in local time.
pub fn request_rows(records: &[ServiceRequest]) -> Vec<ExportRow> {
    request_rows_in(records, &Local)
}

/// Raw-record projection with the `Time` column rendered in `tz`.
pub fn request_rows_in<Tz: TimeZone>(records: &[ServiceRequest], tz: &Tz) -> Vec<ExportRow>
where
    Tz::Offset: std::fmt::Display,
{
    records
        .iter()
        .map(|record| {
            let time = record
                .created_at
                .and_then(|millis| tz.timestamp_millis_opt(millis).earliest())
                .map(|at| at.format("%H:%M:%S").to_string())
                .unwrap_or_default();
            ExportRow::new()
                .with(COL_DATE, record.day_key.to_string())
                .with(COL_NAME, record.name.as_str())
                .with(COL_NATIONAL_ID, record.national_id.as_str())
                .with(COL_NATIONAL_ID_MASKED, record.masked_id())
                .with(COL_SERVICE, record.service.label())
                .with(COL_TIME, time)
        })
        .collect()
}

/// The three summary sheets, in dashboard order.
pub fn summary_tabs(summary: &ReportSummary) -> Vec<SheetTab> {
    let by_day = summary
        .by_day
        .iter()
        .map(|(day, total)| {
            ExportRow::new()
                .with(COL_DAY, day.to_string())
                .with(COL_TOTAL, *total)
        })
        .collect();
    let by_hour = summary
        .by_hour
        .iter()
        .enumerate()
        .map(|(hour, total)| {
            ExportRow::new()
                .with(COL_HOUR, format!("{hour:02}h"))
                .with(COL_TOTAL, *total)
        })
        .collect();
    let by_service = summary
        .by_service
        .iter()
        .map(|(service, total)| {
            ExportRow::new()
                .with(COL_SERVICE, service.label())
                .with(COL_TOTAL, *total)
        })
        .collect();

    vec![
        SheetTab::new(SHEET_BY_DAY, by_day),
        SheetTab::new(SHEET_BY_HOUR, by_hour),
        SheetTab::new(SHEET_BY_SERVICE, by_service),
    ]
}

#[cfg(test)]
mod tests {
    use super::{
        request_rows_in, summary_tabs, CellValue, COL_HOUR, COL_NATIONAL_ID,
        COL_NATIONAL_ID_MASKED, COL_TIME,
    };
    use crate::model::request::ServiceRequest;
    use crate::model::service_type::ServiceType;
    use crate::report::aggregate::ReportSummary;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn record(created_at: Option<i64>) -> ServiceRequest {
        ServiceRequest {
            id: Uuid::new_v4(),
            name: "Ana Lima".to_string(),
            national_id: "12345678909".to_string(),
            service: ServiceType::PropertyTax,
            created_at,
            updated_at: created_at,
            day_key: "2024-04-10".parse().unwrap(),
            created_by: "op".to_string(),
        }
    }

    #[test]
    fn request_rows_carry_raw_and_masked_id() {
        let at = Utc
            .with_ymd_and_hms(2024, 4, 10, 14, 5, 9)
            .unwrap()
            .timestamp_millis();
        let rows = request_rows_in(&[record(Some(at)), record(None)], &Utc);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].get(COL_NATIONAL_ID),
            Some(&CellValue::Text("12345678909".to_string()))
        );
        assert_eq!(
            rows[0].get(COL_NATIONAL_ID_MASKED),
            Some(&CellValue::Text("***.***.789-09".to_string()))
        );
        assert_eq!(
            rows[0].get(COL_TIME),
            Some(&CellValue::Text("14:05:09".to_string()))
        );
        assert_eq!(rows[1].get(COL_TIME), Some(&CellValue::Text(String::new())));
        assert_eq!(rows[0].keys().count(), 6);
    }

    #[test]
    fn summary_tabs_have_dense_hours() {
        let summary = ReportSummary::from_records_in(&[], &Utc);
        let tabs = summary_tabs(&summary);
        assert_eq!(tabs.len(), 3);
        assert!(tabs[0].rows.is_empty());
        assert_eq!(tabs[1].rows.len(), 24);
        assert_eq!(
            tabs[1].rows[7].get(COL_HOUR),
            Some(&CellValue::Text("07h".to_string()))
        );
        assert!(tabs[2].rows.is_empty());
    }
}
