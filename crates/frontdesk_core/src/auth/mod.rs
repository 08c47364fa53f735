//! Authentication collaborator contract and role checks.
//!
//! # Responsibility
//! - Define the session operations consumed by intake and reporting.
//! - Decide whether the signed-in operator is the configured administrator.
//!
//! # Invariants
//! - A failed login leaves the current session unchanged.
//! - Credentials are never logged; events carry the user id only.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod in_memory;

pub use in_memory::InMemoryAuthGateway;

/// Signed-in operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid email or password"),
        }
    }
}

impl Error for AuthError {}

/// Guard failure for protected operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    NotSignedIn,
    NotAdmin,
}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotSignedIn => write!(f, "sign in required"),
            Self::NotAdmin => write!(f, "administrator access required"),
        }
    }
}

impl Error for AccessError {}

/// Identity/session collaborator.
pub trait AuthGateway {
    fn current_user(&self) -> Option<AuthUser>;
    fn login(&mut self, email: &str, password: &str) -> Result<AuthUser, AuthError>;
    fn logout(&mut self);
}

/// Case-insensitive comparison against the configured administrator.
pub fn is_admin(user: &AuthUser, admin_email: &str) -> bool {
    user.email.trim().to_lowercase() == admin_email.trim().to_lowercase()
}

/// Returns the signed-in operator or `NotSignedIn`.
pub fn require_user<A: AuthGateway + ?Sized>(auth: &A) -> Result<AuthUser, AccessError> {
    auth.current_user().ok_or(AccessError::NotSignedIn)
}

/// Returns the signed-in administrator.
pub fn require_admin<A: AuthGateway + ?Sized>(
    auth: &A,
    admin_email: &str,
) -> Result<AuthUser, AccessError> {
    let user = require_user(auth)?;
    if !is_admin(&user, admin_email) {
        return Err(AccessError::NotAdmin);
    }
    Ok(user)
}
