//! Persistent store collaborator.
//!
//! # Responsibility
//! - Define the store contract consumed by intake and reporting.
//! - Isolate SQLite details from service orchestration.
//!
//! # Invariants
//! - Writes enforce `NewServiceRequest::validate()` / `RequestPatch::validate()`.
//! - Errors are semantic (`StoreUnavailable`, `NotFound`) in addition to
//!   DB transport errors.

pub mod request_repo;
pub mod subscription;
