//! Grouped counts over an already-fetched record set.
//!
//! Every reducer is pure and recomputed from scratch; there is no
//! incremental state.

use crate::model::day_key::DayKey;
use crate::model::request::ServiceRequest;
use crate::model::service_type::ServiceType;
use chrono::{Local, TimeZone, Timelike};
use std::collections::{BTreeMap, HashMap};

/// Buckets in the hour-of-day series.
pub const HOURS_PER_DAY: usize = 24;

/// Top entries shown in the "most requested" view.
pub const TOP_SERVICES: usize = 3;

/// Counts per service, highest first; ties keep first-seen order.
pub fn count_by_service(records: &[ServiceRequest]) -> Vec<(ServiceType, usize)> {
    let mut positions: HashMap<ServiceType, usize> = HashMap::new();
    let mut counts: Vec<(ServiceType, usize)> = Vec::new();
    for record in records {
        match positions.get(&record.service) {
            Some(&index) => counts[index].1 += 1,
            None => {
                positions.insert(record.service, counts.len());
                counts.push((record.service, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Counts per day, oldest day first.
pub fn count_by_day(records: &[ServiceRequest]) -> Vec<(DayKey, usize)> {
    let mut counts: BTreeMap<DayKey, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.day_key).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}

/// Dense hour-of-day histogram in the local time zone.
pub fn count_by_hour(records: &[ServiceRequest]) -> [usize; HOURS_PER_DAY] {
    count_by_hour_in(records, &Local)
}

/// Dense hour-of-day histogram in `tz`.
///
/// Records without a resolvable `created_at` are skipped.
pub fn count_by_hour_in<Tz: TimeZone>(
    records: &[ServiceRequest],
    tz: &Tz,
) -> [usize; HOURS_PER_DAY] {
    let mut buckets = [0usize; HOURS_PER_DAY];
    for record in records {
        let Some(millis) = record.created_at else {
            continue;
        };
        let Some(at) = tz.timestamp_millis_opt(millis).earliest() else {
            continue;
        };
        if let Some(slot) = buckets.get_mut(at.hour() as usize) {
            *slot += 1;
        }
    }
    buckets
}

/// Largest value in a series, 0 when empty.
pub fn series_max(values: impl IntoIterator<Item = usize>) -> usize {
    values.into_iter().max().unwrap_or(0)
}

/// Bar width in percent of `max`; 0 when `max` is 0.
pub fn bar_width_percent(value: usize, max: usize) -> f64 {
    if max == 0 {
        return 0.0;
    }
    value as f64 / max as f64 * 100.0
}

/// All dashboard aggregates for one record set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub total: usize,
    pub by_service: Vec<(ServiceType, usize)>,
    pub by_day: Vec<(DayKey, usize)>,
    pub by_hour: [usize; HOURS_PER_DAY],
    pub max_day: usize,
    pub max_hour: usize,
}

impl ReportSummary {
    /// Aggregates `records` using local wall-clock hours.
    pub fn from_records(records: &[ServiceRequest]) -> Self {
        Self::from_records_in(records, &Local)
    }

    pub fn from_records_in<Tz: TimeZone>(records: &[ServiceRequest], tz: &Tz) -> Self {
        let by_day = count_by_day(records);
        let by_hour = count_by_hour_in(records, tz);
        Self {
            total: records.len(),
            by_service: count_by_service(records),
            max_day: series_max(by_day.iter().map(|(_, count)| *count)),
            max_hour: series_max(by_hour),
            by_day,
            by_hour,
        }
    }

    /// The most requested services, at most [`TOP_SERVICES`].
    pub fn top_services(&self) -> &[(ServiceType, usize)] {
        &self.by_service[..self.by_service.len().min(TOP_SERVICES)]
    }
}

impl Default for ReportSummary {
    fn default() -> Self {
        Self::from_records_in(&[], &chrono::Utc)
    }
}
