//! Credential gateway backed by an in-process account table.

use super::{AuthError, AuthGateway, AuthUser};
use log::{info, warn};
use std::collections::BTreeMap;
use uuid::Uuid;

struct Account {
    id: String,
    email: String,
    password: String,
}

/// In-process [`AuthGateway`] for local operation and tests.
#[derive(Default)]
pub struct InMemoryAuthGateway {
    accounts: BTreeMap<String, Account>,
    current: Option<AuthUser>,
}

impl InMemoryAuthGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) an account and returns its user id.
    pub fn register(&mut self, email: &str, password: &str) -> String {
        let key = normalize_email(email);
        let id = self
            .accounts
            .get(&key)
            .map_or_else(|| Uuid::new_v4().to_string(), |account| account.id.clone());
        self.accounts.insert(
            key,
            Account {
                id: id.clone(),
                email: email.trim().to_string(),
                password: password.to_string(),
            },
        );
        id
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

impl AuthGateway for InMemoryAuthGateway {
    fn current_user(&self) -> Option<AuthUser> {
        self.current.clone()
    }

    fn login(&mut self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let Some(account) = self.accounts.get(&normalize_email(email)) else {
            warn!("event=auth_login module=auth status=error error_code=invalid_credentials");
            return Err(AuthError::InvalidCredentials);
        };
        if account.password != password {
            warn!("event=auth_login module=auth status=error error_code=invalid_credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let user = AuthUser {
            id: account.id.clone(),
            email: account.email.clone(),
        };
        info!("event=auth_login module=auth status=ok user_id={}", user.id);
        self.current = Some(user.clone());
        Ok(user)
    }

    fn logout(&mut self) {
        if let Some(user) = self.current.take() {
            info!("event=auth_logout module=auth status=ok user_id={}", user.id);
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
