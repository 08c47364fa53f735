//! Core domain logic for the municipal front-desk intake system.
//! This crate is the single source of truth for record invariants.

pub mod auth;
pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod report;
pub mod service;

pub use auth::{
    is_admin, require_admin, require_user, AccessError, AuthError, AuthGateway, AuthUser,
    InMemoryAuthGateway,
};
pub use config::{ConfigError, FrontdeskConfig};
pub use export::{ExportError, ExportResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::day_key::DayKey;
pub use model::national_id::{format_id_input, mask_id};
pub use model::request::{
    NewServiceRequest, RequestId, RequestPatch, ServiceRequest, ValidationError,
};
pub use model::service_type::ServiceType;
pub use report::aggregate::ReportSummary;
pub use report::detail::RequestDetail;
pub use report::filter::{ReportCriteria, ServiceFilter};
pub use report::paginate::Pager;
pub use repo::request_repo::{
    DayFilter, RepoError, RepoResult, RequestOrder, RequestQuery, RequestRepository,
    SqliteRequestRepository,
};
pub use repo::subscription::Subscription;
pub use service::intake_service::{IntakeBoard, IntakeError, IntakeForm, IntakeService};
pub use service::report_service::{FetchTicket, ReportService, ReportSession};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
