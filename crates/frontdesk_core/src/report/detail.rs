//! Single-record detail for administrators.
//!
//! # Invariants
//! - Carries the unmasked national ID next to its masked form.
//! - A pending `created_at` renders as `None`, never as a made-up time.

use crate::model::day_key::DayKey;
use crate::model::request::{RequestId, ServiceRequest};
use crate::model::service_type::ServiceType;
use chrono::{Local, TimeZone};

/// Wall-clock format for `created_at` / `updated_at`.
pub const DETAIL_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Every field of one record, timestamps rendered in a local zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDetail {
    pub id: RequestId,
    pub day_key: DayKey,
    pub name: String,
    pub national_id: String,
    pub masked_id: String,
    pub service: ServiceType,
    pub created_by: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl RequestDetail {
    pub fn from_request(request: &ServiceRequest) -> Self {
        Self::from_request_in(request, &Local)
    }

    pub fn from_request_in<Tz: TimeZone>(request: &ServiceRequest, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            id: request.id,
            day_key: request.day_key,
            name: request.name.clone(),
            national_id: request.national_id.clone(),
            masked_id: request.masked_id(),
            service: request.service,
            created_by: request.created_by.clone(),
            created_at: local_time(request.created_at, tz),
            updated_at: local_time(request.updated_at, tz),
        }
    }

    /// `(label, value)` pairs in display order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let pending = || "pending".to_string();
        vec![
            ("id", self.id.to_string()),
            ("day", self.day_key.to_string()),
            ("name", self.name.clone()),
            ("national_id", self.national_id.clone()),
            ("national_id_masked", self.masked_id.clone()),
            ("service", self.service.label().to_string()),
            ("created_by", self.created_by.clone()),
            ("created_at", self.created_at.clone().unwrap_or_else(pending)),
            ("updated_at", self.updated_at.clone().unwrap_or_else(pending)),
        ]
    }
}

fn local_time<Tz: TimeZone>(millis: Option<i64>, tz: &Tz) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    millis
        .and_then(|millis| tz.timestamp_millis_opt(millis).earliest())
        .map(|at| at.format(DETAIL_TIME_FORMAT).to_string())
}
