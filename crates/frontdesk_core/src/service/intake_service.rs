//! Front-desk intake use-cases.
//!
//! # Responsibility
//! - Register new service requests for the signed-in operator.
//! - Apply single-field inline edits.
//! - Keep a live list of one day's requests.
//!
//! # Invariants
//! - Validation failures never reach the store.
//! - A failed write leaves local state untouched.
//! - A live-list error clears the list and raises a persistent banner.
//! - Board reads hand out copies; no borrow of board state outlives a call.

use crate::auth::AuthUser;
use crate::model::day_key::DayKey;
use crate::model::national_id::format_id_input;
use crate::model::request::{
    NewServiceRequest, RequestId, RequestPatch, ServiceRequest, ValidationError,
};
use crate::model::service_type::ServiceType;
use crate::repo::request_repo::{
    DayFilter, RepoError, RequestOrder, RequestQuery, RequestRepository,
};
use crate::repo::subscription::Subscription;
use log::{error, info, warn};
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Banner shown when the live list can no longer be trusted.
pub const STORE_FAILURE_BANNER: &str =
    "Could not reach the record store. Reload the page or contact an administrator.";

#[derive(Debug)]
pub enum IntakeError {
    Validation(ValidationError),
    NotFound(RequestId),
    Repo(RepoError),
    /// Write succeeded but the read-back did not find the record.
    InconsistentState(&'static str),
}

impl Display for IntakeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "service request not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent intake state: {details}"),
        }
    }
}

impl Error for IntakeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound(_) | Self::InconsistentState(_) => None,
        }
    }
}

impl From<ValidationError> for IntakeError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for IntakeError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Intake form state as typed by the receptionist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeForm {
    pub name: String,
    /// Formatted as `000.000.000-00` while typing.
    pub national_id_input: String,
    pub service: ServiceType,
}

impl IntakeForm {
    pub fn new(name: &str, national_id: &str, service: ServiceType) -> Self {
        let mut form = Self {
            name: name.to_string(),
            national_id_input: String::new(),
            service,
        };
        form.type_national_id(national_id);
        form
    }

    /// Applies live input masking to new keystrokes.
    pub fn type_national_id(&mut self, raw: &str) {
        self.national_id_input = format_id_input(raw);
    }

    /// Clears the form after a successful registration.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Intake use-case service over a store implementation.
pub struct IntakeService<R: RequestRepository> {
    repo: R,
}

impl<R: RequestRepository> IntakeService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Registers `form` under today's local day key.
    pub fn register(
        &self,
        operator: &AuthUser,
        form: &IntakeForm,
    ) -> Result<ServiceRequest, IntakeError> {
        self.register_on(operator, form, DayKey::today())
    }

    /// Registers `form` under an explicit day key.
    pub fn register_on(
        &self,
        operator: &AuthUser,
        form: &IntakeForm,
        day_key: DayKey,
    ) -> Result<ServiceRequest, IntakeError> {
        let request = NewServiceRequest::from_input(
            &form.name,
            &form.national_id_input,
            form.service,
            day_key,
            operator.id.as_str(),
        );
        if let Err(err) = request.validate() {
            info!("event=intake_register module=service status=rejected reason={err}");
            return Err(err.into());
        }

        let id = self.repo.insert(&request).map_err(|err| {
            error!("event=intake_register module=service status=error error={err}");
            err
        })?;
        info!(
            "event=intake_register module=service status=ok request_id={id} day_key={day_key} service={} user_id={}",
            request.service.code(),
            operator.id
        );

        self.repo
            .get(id)?
            .ok_or(IntakeError::InconsistentState(
                "registered request not found in read-back",
            ))
    }

    /// Applies one inline edit and returns the refreshed record.
    pub fn edit(&self, id: RequestId, patch: &RequestPatch) -> Result<ServiceRequest, IntakeError> {
        patch.validate()?;
        self.repo.update(id, patch).map_err(|err| {
            warn!(
                "event=intake_edit module=service status=error request_id={id} field={} error={err}",
                patch.field()
            );
            err
        })?;
        info!(
            "event=intake_edit module=service status=ok request_id={id} field={}",
            patch.field()
        );

        self.repo
            .get(id)?
            .ok_or(IntakeError::InconsistentState("edited request not found in read-back"))
    }

    /// Opens a live, newest-first list of `day`'s requests.
    pub fn watch_day(&self, day: DayKey) -> IntakeBoard {
        IntakeBoard::open(&self.repo, day)
    }
}

#[derive(Debug, Default)]
struct BoardState {
    items: Vec<ServiceRequest>,
    banner: Option<String>,
}

/// Live list of one day's requests, refreshed by store snapshots.
pub struct IntakeBoard {
    day: DayKey,
    state: Rc<RefCell<BoardState>>,
    subscription: Option<Subscription>,
}

impl IntakeBoard {
    fn open<R: RequestRepository + ?Sized>(repo: &R, day: DayKey) -> Self {
        let state = Rc::new(RefCell::new(BoardState::default()));
        let query = RequestQuery {
            day: DayFilter::On(day),
            service: None,
            order: Some(RequestOrder::CreatedAtDesc),
        };

        let snapshot_state = Rc::clone(&state);
        let error_state = Rc::clone(&state);
        let subscription = repo.subscribe(
            query,
            Box::new(move |snapshot| match snapshot_state.try_borrow_mut() {
                Ok(mut state) => state.items = snapshot.to_vec(),
                Err(_) => warn!(
                    "event=intake_board module=service status=skipped reason=board_borrowed"
                ),
            }),
            Box::new(move |err| {
                error!("event=intake_board module=service status=error error={err}");
                fail(&error_state);
            }),
        );

        let subscription = match subscription {
            Ok(subscription) => Some(subscription),
            Err(err) => {
                error!("event=intake_board module=service status=error day_key={day} error={err}");
                fail(&state);
                None
            }
        };

        Self {
            day,
            state,
            subscription,
        }
    }

    pub fn day(&self) -> DayKey {
        self.day
    }

    /// Copy of the current snapshot, newest first.
    pub fn items(&self) -> Vec<ServiceRequest> {
        self.state.borrow().items.clone()
    }

    /// Persistent error banner, if the live list failed.
    pub fn banner(&self) -> Option<String> {
        self.state.borrow().banner.clone()
    }

    /// Whether snapshots are still being delivered.
    pub fn is_live(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    /// Stops updates; the last snapshot stays readable.
    pub fn close(&mut self) {
        self.subscription = None;
    }
}

fn fail(state: &RefCell<BoardState>) {
    let Ok(mut state) = state.try_borrow_mut() else {
        warn!("event=intake_board module=service status=skipped reason=board_borrowed");
        return;
    };
    state.items.clear();
    state.banner = Some(STORE_FAILURE_BANNER.to_string());
}
