//! Service request domain record.
//!
//! # Responsibility
//! - Define the persisted intake entry and its write-side shapes.
//! - Validate intake input before anything reaches storage.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused.
//! - `national_id` holds digits only; persisted values have exactly 11.
//! - `created_at` / `updated_at` are store clock values in epoch millis.
//! - `day_key` is written on insert and never updated.

use crate::model::day_key::DayKey;
use crate::model::national_id::{id_digits, is_complete_id, mask_id, NATIONAL_ID_LEN};
use crate::model::service_type::ServiceType;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a persisted service request.
pub type RequestId = Uuid;

/// One citizen intake entry as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: RequestId,
    /// Trimmed citizen name.
    pub name: String,
    /// Raw 11-digit national ID. Render with [`ServiceRequest::masked_id`].
    pub national_id: String,
    pub service: ServiceType,
    /// Epoch millis; `None` while a server timestamp is unresolved.
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub day_key: DayKey,
    /// Id of the operator who registered the request.
    pub created_by: String,
}

impl ServiceRequest {
    /// Display form of the national ID.
    pub fn masked_id(&self) -> String {
        mask_id(&self.national_id)
    }
}

/// Insert payload. Timestamps and id are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewServiceRequest {
    pub name: String,
    pub national_id: String,
    pub service: ServiceType,
    pub day_key: DayKey,
    pub created_by: String,
}

impl NewServiceRequest {
    /// Builds an insert payload from raw form input.
    ///
    /// Name is trimmed and the ID reduced to digits; call [`Self::validate`]
    /// before persisting.
    pub fn from_input(
        name: &str,
        national_id_input: &str,
        service: ServiceType,
        day_key: DayKey,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            name: name.trim().to_string(),
            national_id: id_digits(national_id_input),
            service,
            day_key,
            created_by: created_by.into(),
        }
    }

    /// Checks persistence invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_national_id(&self.national_id)
    }
}

/// Single-field inline edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPatch {
    Name(String),
    NationalId(String),
    Service(ServiceType),
}

impl RequestPatch {
    /// Normalizes raw edit input the same way intake does.
    pub fn name(value: &str) -> Self {
        Self::Name(value.trim().to_string())
    }

    pub fn national_id(value: &str) -> Self {
        Self::NationalId(id_digits(value))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Name(name) => validate_name(name),
            Self::NationalId(digits) => validate_national_id(digits),
            Self::Service(_) => Ok(()),
        }
    }

    /// Column label used in logs; never includes the value.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::NationalId(_) => "national_id",
            Self::Service(_) => "service",
        }
    }
}

/// Intake input rejected before reaching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is empty after trimming.
    EmptyName,
    /// National ID does not have exactly 11 digits.
    NationalIdLength { digits: usize },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name is required"),
            Self::NationalIdLength { digits } => write!(
                f,
                "national ID must have {NATIONAL_ID_LEN} digits, got {digits}"
            ),
        }
    }
}

impl Error for ValidationError {}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

fn validate_national_id(digits: &str) -> Result<(), ValidationError> {
    if !is_complete_id(digits) {
        return Err(ValidationError::NationalIdLength {
            digits: digits.chars().filter(char::is_ascii_digit).count(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NewServiceRequest, RequestPatch, ValidationError};
    use crate::model::day_key::DayKey;
    use crate::model::service_type::ServiceType;

    fn day() -> DayKey {
        "2024-05-02".parse().unwrap()
    }

    #[test]
    fn from_input_normalizes_name_and_id() {
        let draft = NewServiceRequest::from_input(
            "  Maria Silva ",
            "123.456.789-09",
            ServiceType::Housing,
            day(),
            "op-1",
        );
        assert_eq!(draft.name, "Maria Silva");
        assert_eq!(draft.national_id, "12345678909");
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_name_before_id() {
        let draft = NewServiceRequest::from_input("   ", "123", ServiceType::Other, day(), "op");
        assert_eq!(draft.validate(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn validate_rejects_short_id() {
        let draft =
            NewServiceRequest::from_input("Ana", "123.456", ServiceType::Other, day(), "op");
        assert_eq!(
            draft.validate(),
            Err(ValidationError::NationalIdLength { digits: 6 })
        );
    }

    #[test]
    fn patch_normalizes_and_validates() {
        assert_eq!(
            RequestPatch::national_id("987.654.321-00"),
            RequestPatch::NationalId("98765432100".to_string())
        );
        assert!(RequestPatch::national_id("987").validate().is_err());
        assert!(RequestPatch::name("  ").validate().is_err());
        assert!(RequestPatch::Service(ServiceType::Ombudsman).validate().is_ok());
    }
}
