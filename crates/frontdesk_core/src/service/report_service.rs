//! Administrator reporting use-cases.
//!
//! # Responsibility
//! - Hold the dashboard state: applied criteria, filtered records,
//!   aggregates and the page cursor.
//! - Apply fetch results in issue order and export the current set.
//!
//! # Invariants
//! - Only the result of the latest issued fetch is applied; older results
//!   are discarded.
//! - A failed fetch leaves records, aggregates and page untouched.
//! - Applying new criteria or a new page size returns to page 1.
//! - Exports serialize the whole filtered set, not the visible page.

use crate::export::delimited::write_delimited;
use crate::export::rows::{request_rows, summary_tabs, ExportRow, SheetTab};
use crate::export::spreadsheet::{write_rows_xlsx, write_tabs_xlsx};
use crate::export::ExportResult;
use crate::model::request::{RequestId, ServiceRequest};
use crate::report::aggregate::ReportSummary;
use crate::report::detail::RequestDetail;
use crate::report::filter::{fetch, ReportCriteria};
use crate::report::paginate::Pager;
use crate::repo::request_repo::{RepoError, RepoResult, RequestRepository};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Identifies one issued fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    sequence: u64,
    criteria: ReportCriteria,
}

impl FetchTicket {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn criteria(&self) -> &ReportCriteria {
        &self.criteria
    }
}

/// Dashboard state owned by the admin screen.
#[derive(Debug, Clone)]
pub struct ReportSession {
    criteria: ReportCriteria,
    records: Vec<ServiceRequest>,
    summary: ReportSummary,
    pager: Pager,
    last_issued: u64,
    loading: bool,
}

impl ReportSession {
    /// Empty session for `criteria`; nothing is fetched yet.
    pub fn new(criteria: ReportCriteria) -> Self {
        Self {
            criteria,
            records: Vec::new(),
            summary: ReportSummary::default(),
            pager: Pager::default(),
            last_issued: 0,
            loading: false,
        }
    }

    /// Issues a ticket for a fetch of `criteria`; supersedes older tickets.
    pub fn begin_fetch(&mut self, criteria: ReportCriteria) -> FetchTicket {
        self.last_issued += 1;
        self.loading = true;
        FetchTicket {
            sequence: self.last_issued,
            criteria,
        }
    }

    /// Applies a fetch outcome.
    ///
    /// Returns `Ok(false)` when `ticket` was superseded and the outcome was
    /// dropped.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        outcome: RepoResult<Vec<ServiceRequest>>,
    ) -> RepoResult<bool> {
        if ticket.sequence != self.last_issued {
            info!(
                "event=report_fetch module=service status=discarded ticket={} latest={}",
                ticket.sequence, self.last_issued
            );
            return Ok(false);
        }
        self.loading = false;

        let records = outcome.map_err(|err| {
            warn!(
                "event=report_fetch module=service status=error ticket={} error={err}",
                ticket.sequence
            );
            err
        })?;

        info!(
            "event=report_fetch module=service status=ok ticket={} start_day={} end_day={} service={} rows={}",
            ticket.sequence,
            ticket.criteria.start_day,
            ticket.criteria.end_day,
            ticket.criteria.service,
            records.len()
        );
        self.summary = ReportSummary::from_records(&records);
        self.records = records;
        self.criteria = ticket.criteria;
        self.pager.reset();
        Ok(true)
    }

    /// Replaces the record set directly, e.g. from a snapshot.
    pub fn replace_records(&mut self, records: Vec<ServiceRequest>) {
        self.summary = ReportSummary::from_records(&records);
        self.records = records;
        self.pager.reset();
    }

    pub fn criteria(&self) -> &ReportCriteria {
        &self.criteria
    }

    pub fn records(&self) -> &[ServiceRequest] {
        &self.records
    }

    pub fn summary(&self) -> &ReportSummary {
        &self.summary
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    /// Records on the current page.
    pub fn page(&self) -> &[ServiceRequest] {
        self.pager.slice(&self.records)
    }

    pub fn total_pages(&self) -> usize {
        self.pager.total_pages(self.records.len())
    }

    pub fn has_next_page(&self) -> bool {
        self.pager.has_next(self.records.len())
    }

    pub fn has_previous_page(&self) -> bool {
        self.pager.has_previous()
    }

    pub fn next_page(&mut self) {
        self.pager.next(self.records.len());
    }

    pub fn previous_page(&mut self) {
        self.pager.previous();
    }

    /// Jumps to `page`, clamped to the pages of the current set.
    pub fn go_to_page(&mut self, page: usize) {
        self.pager.go_to_clamped(page, self.records.len());
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.pager.set_page_size(page_size);
    }

    /// Raw rows (including the unmasked ID) for the whole filtered set.
    pub fn export_rows(&self) -> Vec<ExportRow> {
        request_rows(&self.records)
    }

    pub fn summary_tabs(&self) -> Vec<SheetTab> {
        summary_tabs(&self.summary)
    }

    /// `requests_<start>_<end>`.
    pub fn records_base_name(&self) -> String {
        format!(
            "requests_{}_{}",
            self.criteria.start_day, self.criteria.end_day
        )
    }

    /// `summary_<start>_<end>`.
    pub fn summary_base_name(&self) -> String {
        format!(
            "summary_{}_{}",
            self.criteria.start_day, self.criteria.end_day
        )
    }

    /// Writes the filtered set as `.csv` into `dir`; `None` when empty.
    pub fn export_csv(&self, dir: &Path) -> ExportResult<Option<PathBuf>> {
        write_delimited(&dir.join(self.records_base_name()), &self.export_rows())
    }

    /// Writes the filtered set as a one-sheet `.xlsx`; `None` when empty.
    pub fn export_xlsx(&self, dir: &Path) -> ExportResult<Option<PathBuf>> {
        write_rows_xlsx(&dir.join(self.records_base_name()), &self.export_rows())
    }

    /// Writes the by-day, by-hour and by-service sheets.
    pub fn export_summary(&self, dir: &Path) -> ExportResult<PathBuf> {
        write_tabs_xlsx(&dir.join(self.summary_base_name()), &self.summary_tabs())
    }
}

impl Default for ReportSession {
    fn default() -> Self {
        Self::new(ReportCriteria::today())
    }
}

/// Reporting use-case service over a store implementation.
pub struct ReportService<R: RequestRepository> {
    repo: R,
}

impl<R: RequestRepository> ReportService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Fetches and narrows records for `criteria` without touching state.
    pub fn fetch(&self, criteria: &ReportCriteria) -> RepoResult<Vec<ServiceRequest>> {
        fetch(&self.repo, criteria)
    }

    /// Loads one record's detail view.
    ///
    /// # Errors
    /// - `NotFound` when no record has `id`.
    pub fn detail(&self, id: RequestId) -> RepoResult<RequestDetail> {
        let request = self.repo.get(id)?.ok_or(RepoError::NotFound(id))?;
        info!("event=report_detail module=service status=ok request_id={id}");
        Ok(RequestDetail::from_request(&request))
    }

    /// Fetches `criteria` and applies the result to `session`.
    pub fn apply_filters(
        &self,
        session: &mut ReportSession,
        criteria: ReportCriteria,
    ) -> RepoResult<()> {
        let ticket = session.begin_fetch(criteria);
        let outcome = self.fetch(ticket.criteria());
        session.complete_fetch(ticket, outcome).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::{ReportService, ReportSession};
    use crate::db::open_db_in_memory;
    use crate::model::day_key::DayKey;
    use crate::model::request::{NewServiceRequest, ServiceRequest};
    use crate::model::service_type::ServiceType;
    use crate::report::filter::ReportCriteria;
    use crate::repo::request_repo::{RepoError, RequestRepository, SqliteRequestRepository};
    use uuid::Uuid;

    fn day(value: &str) -> DayKey {
        value.parse().unwrap()
    }

    fn january() -> ReportCriteria {
        ReportCriteria::for_range(day("2024-01-01"), day("2024-01-31"))
    }

    fn record(day_key: &str) -> ServiceRequest {
        ServiceRequest {
            id: Uuid::new_v4(),
            name: "Maria".to_string(),
            national_id: "12345678909".to_string(),
            service: ServiceType::Housing,
            created_at: None,
            updated_at: None,
            day_key: day(day_key),
            created_by: "op".to_string(),
        }
    }

    fn seeded_repo(count: usize) -> SqliteRequestRepository {
        let repo = SqliteRequestRepository::new(open_db_in_memory().unwrap());
        for index in 0..count {
            let request = NewServiceRequest::from_input(
                &format!("Citizen {index}"),
                "123.456.789-09",
                ServiceType::SingleRegistry,
                day("2024-01-10"),
                "op",
            );
            repo.insert(&request).unwrap();
        }
        repo
    }

    #[test]
    fn superseded_fetch_is_discarded() {
        let mut session = ReportSession::new(january());
        let stale = session.begin_fetch(january());
        let latest = session.begin_fetch(january());

        assert!(session.complete_fetch(latest, Ok(vec![record("2024-01-05")])).unwrap());
        assert!(!session
            .complete_fetch(stale, Ok(vec![record("2024-01-06"), record("2024-01-07")]))
            .unwrap());

        assert_eq!(session.records().len(), 1);
        assert_eq!(session.summary().total, 1);
        assert!(!session.is_loading());
    }

    #[test]
    fn failed_fetch_keeps_previous_results() {
        let mut session = ReportSession::new(january());
        let first = session.begin_fetch(january());
        session
            .complete_fetch(first, Ok(vec![record("2024-01-05"), record("2024-01-04")]))
            .unwrap();

        let second = session.begin_fetch(january());
        let err = session
            .complete_fetch(second, Err(RepoError::StoreUnavailable))
            .unwrap_err();

        assert!(matches!(err, RepoError::StoreUnavailable));
        assert_eq!(session.records().len(), 2);
        assert_eq!(session.summary().total, 2);
        assert!(!session.is_loading());
    }

    #[test]
    fn applying_filters_returns_to_first_page() {
        let service = ReportService::new(seeded_repo(45));
        let mut session = ReportSession::new(january());

        service.apply_filters(&mut session, january()).unwrap();
        assert_eq!(session.total_pages(), 3);
        session.next_page();
        session.next_page();
        assert_eq!(session.pager().page(), 3);
        assert_eq!(session.page().len(), 5);
        assert!(!session.has_next_page());

        service.apply_filters(&mut session, january()).unwrap();
        assert_eq!(session.pager().page(), 1);
        assert_eq!(session.page().len(), 20);
    }

    #[test]
    fn page_jumps_are_clamped_to_the_set() {
        let service = ReportService::new(seeded_repo(45));
        let mut session = ReportSession::new(january());
        service.apply_filters(&mut session, january()).unwrap();

        session.go_to_page(9);
        assert_eq!(session.pager().page(), 3);
        assert_eq!(session.page().len(), 5);

        session.go_to_page(0);
        assert_eq!(session.pager().page(), 1);
        assert_eq!(session.page().len(), 20);
    }

    #[test]
    fn detail_loads_one_record_or_reports_not_found() {
        let service = ReportService::new(seeded_repo(1));
        let stored = service.fetch(&january()).unwrap().remove(0);

        let detail = service.detail(stored.id).unwrap();
        assert_eq!(detail.id, stored.id);
        assert_eq!(detail.national_id, "12345678909");
        assert_eq!(detail.masked_id, "***.***.789-09");
        assert!(detail.created_at.is_some());

        let missing = Uuid::new_v4();
        assert!(matches!(
            service.detail(missing),
            Err(RepoError::NotFound(id)) if id == missing
        ));
    }

    #[test]
    fn unavailable_store_surfaces_error() {
        let service = ReportService::new(SqliteRequestRepository::unavailable());
        let mut session = ReportSession::new(january());
        assert!(matches!(
            service.apply_filters(&mut session, january()),
            Err(RepoError::StoreUnavailable)
        ));
        assert!(session.records().is_empty());
    }

    #[test]
    fn export_names_follow_applied_range() {
        let service = ReportService::new(seeded_repo(1));
        let mut session = ReportSession::default();
        service.apply_filters(&mut session, january()).unwrap();

        assert_eq!(session.records_base_name(), "requests_2024-01-01_2024-01-31");
        assert_eq!(session.summary_base_name(), "summary_2024-01-01_2024-01-31");
    }

    #[test]
    fn exports_write_whole_filtered_set() {
        let dir = tempfile::tempdir().unwrap();
        let service = ReportService::new(seeded_repo(25));
        let mut session = ReportSession::new(january());
        service.apply_filters(&mut session, january()).unwrap();

        let csv = session.export_csv(dir.path()).unwrap().unwrap();
        let text = std::fs::read_to_string(&csv).unwrap();
        assert_eq!(text.lines().count(), 26);
        assert!(csv.ends_with("requests_2024-01-01_2024-01-31.csv"));

        let xlsx = session.export_xlsx(dir.path()).unwrap().unwrap();
        assert!(xlsx.ends_with("requests_2024-01-01_2024-01-31.xlsx"));

        let summary = session.export_summary(dir.path()).unwrap();
        assert!(std::fs::read(summary).unwrap().starts_with(b"PK"));
    }

    #[test]
    fn empty_set_exports_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let session = ReportSession::new(january());
        assert!(session.export_csv(dir.path()).unwrap().is_none());
        assert!(session.export_xlsx(dir.path()).unwrap().is_none());
    }
}
