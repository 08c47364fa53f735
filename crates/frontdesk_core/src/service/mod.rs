//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate store and auth collaborators into intake and reporting
//!   use-cases.
//! - Keep CLI/UI layers decoupled from storage details.

pub mod intake_service;
pub mod report_service;
