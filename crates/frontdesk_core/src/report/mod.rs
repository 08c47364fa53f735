//! Reporting pipeline: filter, aggregate, paginate.
//!
//! # Responsibility
//! - Turn report criteria into a store query plus in-memory narrowing.
//! - Derive the fixed dashboard aggregates (by day, hour and service).
//! - Slice the filtered set into display pages.
//! - Expand one record into its administrator detail view.
//!
//! # Invariants
//! - Aggregation and pagination are pure over already-fetched records.
//! - Every record returned by `filter::fetch` lies within the criteria's
//!   inclusive day range and matches the requested service, if any.

pub mod aggregate;
pub mod detail;
pub mod filter;
pub mod paginate;
