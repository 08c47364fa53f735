//! Service-request domain model.
//!
//! # Responsibility
//! - Define the canonical intake record shared by intake and reporting.
//! - Own the national ID normalization and masking rules.
//!
//! # Invariants
//! - Every persisted record is identified by a stable `RequestId`.
//! - `day_key` is fixed at creation and never recomputed.
//! - Records are never deleted; edits touch one field at a time.

pub mod day_key;
pub mod national_id;
pub mod request;
pub mod service_type;
