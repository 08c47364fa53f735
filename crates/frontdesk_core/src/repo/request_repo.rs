//! Service request store contract and SQLite implementation.
//!
//! # Responsibility
//! - Range/equality queries, live subscriptions, inserts and single-field
//!   updates over `service_requests`.
//! - Assign ids and timestamps on the store side.
//!
//! # Invariants
//! - Write paths validate input before any SQL runs.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - An uninitialized repository fails every call with `StoreUnavailable`.

use crate::db::DbError;
use crate::model::day_key::DayKey;
use crate::model::national_id::is_complete_id;
use crate::model::request::{
    NewServiceRequest, RequestId, RequestPatch, ServiceRequest, ValidationError,
};
use crate::model::service_type::ServiceType;
use crate::repo::subscription::{ErrorCallback, SnapshotCallback, SubscriberRegistry, Subscription};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use uuid::Uuid;

/// Store clock in epoch milliseconds.
const NOW_MS_SQL: &str = "CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)";

const REQUEST_SELECT_SQL: &str = "SELECT
    id,
    name,
    national_id,
    service,
    day_key,
    created_by,
    created_at,
    updated_at
FROM service_requests";

pub type RepoResult<T> = Result<T, RepoError>;

/// Store-level error for service request persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    /// The store was never initialized (e.g. missing configuration).
    StoreUnavailable,
    Validation(ValidationError),
    Db(DbError),
    NotFound(RequestId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StoreUnavailable => write!(f, "record store is not initialized"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "service request not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted request data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::StoreUnavailable | Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Day predicate applied on the store side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DayFilter {
    #[default]
    Any,
    On(DayKey),
    /// Inclusive on both ends. `start > end` matches nothing.
    Range { start: DayKey, end: DayKey },
}

/// Explicit sort key for store queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOrder {
    /// Newest first; used by the live intake board.
    CreatedAtDesc,
    DayKeyDesc,
}

/// Conjunctive store query. Substring predicates are not supported here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestQuery {
    pub day: DayFilter,
    pub service: Option<ServiceType>,
    /// `None` keeps insertion order.
    pub order: Option<RequestOrder>,
}

/// Store collaborator contract.
pub trait RequestRepository {
    /// Runs `query` once and returns a finite snapshot.
    fn query(&self, query: &RequestQuery) -> RepoResult<Vec<ServiceRequest>>;
    /// Delivers the current snapshot immediately, then a fresh one after
    /// every write until the returned handle is dropped or a re-query fails.
    fn subscribe(
        &self,
        query: RequestQuery,
        on_snapshot: SnapshotCallback,
        on_error: ErrorCallback,
    ) -> RepoResult<Subscription>;
    /// Persists a validated request and returns its store-assigned id.
    fn insert(&self, request: &NewServiceRequest) -> RepoResult<RequestId>;
    /// Updates one field and refreshes `updated_at`.
    fn update(&self, id: RequestId, patch: &RequestPatch) -> RepoResult<()>;
    fn get(&self, id: RequestId) -> RepoResult<Option<ServiceRequest>>;
}

/// SQLite-backed service request store.
pub struct SqliteRequestRepository {
    conn: Option<Connection>,
    subscribers: Rc<SubscriberRegistry>,
}

impl SqliteRequestRepository {
    /// Wraps a migrated connection (see [`crate::db::open_db`]).
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Some(conn),
            subscribers: Rc::new(SubscriberRegistry::default()),
        }
    }

    /// A store that was never initialized; every call yields
    /// `StoreUnavailable`.
    pub fn unavailable() -> Self {
        Self {
            conn: None,
            subscribers: Rc::new(SubscriberRegistry::default()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.conn.is_some()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn conn(&self) -> RepoResult<&Connection> {
        self.conn.as_ref().ok_or(RepoError::StoreUnavailable)
    }

    fn notify_subscribers(&self) {
        if let Some(conn) = self.conn.as_ref() {
            self.subscribers.notify(|query| run_query(conn, query));
        }
    }
}

impl RequestRepository for SqliteRequestRepository {
    fn query(&self, query: &RequestQuery) -> RepoResult<Vec<ServiceRequest>> {
        run_query(self.conn()?, query)
    }

    fn subscribe(
        &self,
        query: RequestQuery,
        mut on_snapshot: SnapshotCallback,
        on_error: ErrorCallback,
    ) -> RepoResult<Subscription> {
        let initial = run_query(self.conn()?, &query)?;
        on_snapshot(&initial);
        Ok(self.subscribers.register(query, on_snapshot, on_error))
    }

    fn insert(&self, request: &NewServiceRequest) -> RepoResult<RequestId> {
        let conn = self.conn()?;
        request.validate()?;

        let id = Uuid::new_v4();
        conn.execute(
            &format!(
                "INSERT INTO service_requests (
                    id,
                    name,
                    national_id,
                    service,
                    day_key,
                    created_by,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, {NOW_MS_SQL}, {NOW_MS_SQL});"
            ),
            params![
                id.to_string(),
                request.name.as_str(),
                request.national_id.as_str(),
                request.service.code(),
                request.day_key.to_string(),
                request.created_by.as_str(),
            ],
        )?;

        self.notify_subscribers();
        Ok(id)
    }

    fn update(&self, id: RequestId, patch: &RequestPatch) -> RepoResult<()> {
        let conn = self.conn()?;
        patch.validate()?;

        let (column, value) = match patch {
            RequestPatch::Name(name) => ("name", name.clone()),
            RequestPatch::NationalId(digits) => ("national_id", digits.clone()),
            RequestPatch::Service(service) => ("service", service.code().to_string()),
        };
        let changed = conn.execute(
            &format!(
                "UPDATE service_requests
                 SET {column} = ?1, updated_at = {NOW_MS_SQL}
                 WHERE id = ?2;"
            ),
            params![value, id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.notify_subscribers();
        Ok(())
    }

    fn get(&self, id: RequestId) -> RepoResult<Option<ServiceRequest>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{REQUEST_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_request_row(row)?));
        }
        Ok(None)
    }
}

fn run_query(conn: &Connection, query: &RequestQuery) -> RepoResult<Vec<ServiceRequest>> {
    let mut sql = format!("{REQUEST_SELECT_SQL} WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();

    match query.day {
        DayFilter::Any => {}
        DayFilter::On(day) => {
            sql.push_str(" AND day_key = ?");
            bind_values.push(Value::Text(day.to_string()));
        }
        DayFilter::Range { start, end } => {
            sql.push_str(" AND day_key >= ? AND day_key <= ?");
            bind_values.push(Value::Text(start.to_string()));
            bind_values.push(Value::Text(end.to_string()));
        }
    }

    if let Some(service) = query.service {
        sql.push_str(" AND service = ?");
        bind_values.push(Value::Text(service.code().to_string()));
    }

    sql.push_str(match query.order {
        Some(RequestOrder::CreatedAtDesc) => " ORDER BY created_at DESC, rowid DESC",
        Some(RequestOrder::DayKeyDesc) => " ORDER BY day_key DESC, rowid ASC",
        None => " ORDER BY rowid ASC",
    });

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut requests = Vec::new();
    while let Some(row) = rows.next()? {
        requests.push(parse_request_row(row)?);
    }
    Ok(requests)
}

fn parse_request_row(row: &Row<'_>) -> RepoResult<ServiceRequest> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in service_requests.id"))
    })?;

    let service_code: String = row.get("service")?;
    let service = ServiceType::from_code(&service_code).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid service `{service_code}` in service_requests.service"
        ))
    })?;

    let day_text: String = row.get("day_key")?;
    let day_key = day_text.parse::<DayKey>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid day key `{day_text}` in service_requests.day_key"
        ))
    })?;

    // The value itself is PII; report the row id only.
    let national_id: String = row.get("national_id")?;
    if !is_complete_id(&national_id) {
        return Err(RepoError::InvalidData(format!(
            "invalid national_id in service_requests row {id}"
        )));
    }

    Ok(ServiceRequest {
        id,
        name: row.get("name")?,
        national_id,
        service,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        day_key,
        created_by: row.get("created_by")?,
    })
}
