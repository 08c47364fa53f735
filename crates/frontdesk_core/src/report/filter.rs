//! Report criteria and the fetch-then-narrow query engine.
//!
//! # Invariants
//! - Day range and service equality are sent to the store; name and ID
//!   substring terms are applied in memory only.
//! - Results are ordered by `day_key` descending, stable on fetch order.
//! - A failed fetch returns the error and touches no caller state.

use crate::model::day_key::DayKey;
use crate::model::national_id::only_digits;
use crate::model::request::ServiceRequest;
use crate::model::service_type::ServiceType;
use crate::repo::request_repo::{DayFilter, RepoResult, RequestQuery, RequestRepository};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Service selector with an explicit "all services" value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ServiceFilter {
    #[default]
    All,
    Only(ServiceType),
}

impl ServiceFilter {
    pub fn service(self) -> Option<ServiceType> {
        match self {
            Self::All => None,
            Self::Only(service) => Some(service),
        }
    }
}

impl Display for ServiceFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(service) => f.write_str(service.code()),
        }
    }
}

impl FromStr for ServiceFilter {
    type Err = crate::model::service_type::UnknownServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        value.parse().map(Self::Only)
    }
}

/// User-specified report filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportCriteria {
    /// Inclusive lower bound.
    pub start_day: DayKey,
    /// Inclusive upper bound.
    pub end_day: DayKey,
    pub service: ServiceFilter,
    /// Case-insensitive substring of the citizen name.
    pub name_contains: String,
    /// Digits matched as a substring of the raw national ID.
    pub id_contains: String,
}

impl ReportCriteria {
    /// Criteria covering `[start_day, end_day]` with no other filter.
    pub fn for_range(start_day: DayKey, end_day: DayKey) -> Self {
        Self {
            start_day,
            end_day,
            service: ServiceFilter::All,
            name_contains: String::new(),
            id_contains: String::new(),
        }
    }

    /// Today's records only; the dashboard's initial state.
    pub fn today() -> Self {
        let today = DayKey::today();
        Self::for_range(today, today)
    }

    /// Predicate sent to the store.
    pub fn store_query(&self) -> RequestQuery {
        RequestQuery {
            day: DayFilter::Range {
                start: self.start_day,
                end: self.end_day,
            },
            service: self.service.service(),
            order: None,
        }
    }

    /// Whether `request` passes the in-memory substring filters.
    pub fn matches_terms(&self, request: &ServiceRequest) -> bool {
        let name_term = self.name_contains.trim().to_lowercase();
        if !name_term.is_empty() && !request.name.to_lowercase().contains(&name_term) {
            return false;
        }
        let id_term = only_digits(&self.id_contains);
        if !id_term.is_empty() && !request.national_id.contains(&id_term) {
            return false;
        }
        true
    }
}

/// Fetches the criteria's range from the store and narrows it in memory.
pub fn fetch<R: RequestRepository + ?Sized>(
    repo: &R,
    criteria: &ReportCriteria,
) -> RepoResult<Vec<ServiceRequest>> {
    let fetched = repo.query(&criteria.store_query())?;
    Ok(narrow(fetched, criteria))
}

/// Applies substring filters and the newest-day-first ordering.
pub fn narrow(records: Vec<ServiceRequest>, criteria: &ReportCriteria) -> Vec<ServiceRequest> {
    let mut narrowed: Vec<ServiceRequest> = records
        .into_iter()
        .filter(|request| criteria.matches_terms(request))
        .collect();
    sort_newest_day_first(&mut narrowed);
    narrowed
}

/// Stable sort by `day_key` descending.
pub fn sort_newest_day_first(records: &mut [ServiceRequest]) {
    records.sort_by(|a, b| b.day_key.cmp(&a.day_key));
}

#[cfg(test)]
mod tests {
    use super::{narrow, ReportCriteria, ServiceFilter};
    use crate::model::request::ServiceRequest;
    use crate::model::service_type::ServiceType;
    use uuid::Uuid;

    fn request(day: &str, name: &str, national_id: &str) -> ServiceRequest {
        ServiceRequest {
            id: Uuid::new_v4(),
            name: name.to_string(),
            national_id: national_id.to_string(),
            service: ServiceType::Other,
            created_at: None,
            updated_at: None,
            day_key: day.parse().unwrap(),
            created_by: "op".to_string(),
        }
    }

    fn criteria() -> ReportCriteria {
        ReportCriteria::for_range("2024-01-01".parse().unwrap(), "2024-01-31".parse().unwrap())
    }

    #[test]
    fn name_term_is_trimmed_and_case_insensitive() {
        let mut criteria = criteria();
        criteria.name_contains = "  SILVA ".to_string();
        let rows = vec![
            request("2024-01-02", "Maria da Silva", "11111111111"),
            request("2024-01-02", "João Souza", "22222222222"),
        ];
        let narrowed = narrow(rows, &criteria);
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].name, "Maria da Silva");
    }

    #[test]
    fn id_term_ignores_separators() {
        let mut criteria = criteria();
        criteria.id_contains = "456.7".to_string();
        let rows = vec![
            request("2024-01-02", "A", "12345678909"),
            request("2024-01-02", "B", "99999999999"),
        ];
        let narrowed = narrow(rows, &criteria);
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].name, "A");
    }

    #[test]
    fn ordering_is_newest_day_first_and_stable() {
        let rows = vec![
            request("2024-01-01", "first-old", "11111111111"),
            request("2024-01-03", "first-new", "11111111111"),
            request("2024-01-01", "second-old", "11111111111"),
            request("2024-01-03", "second-new", "11111111111"),
        ];
        let names: Vec<String> = narrow(rows, &criteria())
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["first-new", "second-new", "first-old", "second-old"]);
    }

    #[test]
    fn all_services_sends_no_service_predicate() {
        let mut criteria = criteria();
        assert_eq!(criteria.store_query().service, None);
        criteria.service = ServiceFilter::Only(ServiceType::Housing);
        assert_eq!(criteria.store_query().service, Some(ServiceType::Housing));
    }

    #[test]
    fn service_filter_parses_all_sentinel() {
        assert_eq!("ALL".parse::<ServiceFilter>().unwrap(), ServiceFilter::All);
        assert_eq!(
            "ombudsman".parse::<ServiceFilter>().unwrap(),
            ServiceFilter::Only(ServiceType::Ombudsman)
        );
    }
}
