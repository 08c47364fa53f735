//! Environment-driven runtime configuration.
//!
//! # Responsibility
//! - Read store, admin and logging settings from `FRONTDESK_*` variables.
//! - Report missing settings without failing startup.
//!
//! # Invariants
//! - A missing `FRONTDESK_DB_PATH` yields an uninitialized store, not a
//!   startup error.
//! - Account passwords are never echoed in errors or logs.

use crate::auth::InMemoryAuthGateway;
use crate::db::open_db;
use crate::logging::default_log_level;
use crate::repo::request_repo::SqliteRequestRepository;
use log::{error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "FRONTDESK_DB_PATH";
pub const ENV_ADMIN_EMAIL: &str = "FRONTDESK_ADMIN_EMAIL";
pub const ENV_LOG_LEVEL: &str = "FRONTDESK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "FRONTDESK_LOG_DIR";
pub const ENV_ACCOUNTS: &str = "FRONTDESK_ACCOUNTS";

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@prefeitura.local";

/// One seeded operator account.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountSeed {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AccountSeed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSeed")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An account entry is not `email:password`.
    MalformedAccount { index: usize },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedAccount { index } => write!(
                f,
                "{ENV_ACCOUNTS} entry #{index} must look like `email:password`"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontdeskConfig {
    pub db_path: Option<PathBuf>,
    pub admin_email: String,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    pub accounts: Vec<AccountSeed>,
}

impl FrontdeskConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let accounts = match get(ENV_ACCOUNTS) {
            Some(raw) => parse_accounts(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            db_path: get(ENV_DB_PATH).map(PathBuf::from),
            admin_email: get(ENV_ADMIN_EMAIL).unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string()),
            log_level: get(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: get(ENV_LOG_DIR).map(PathBuf::from),
            accounts,
        })
    }

    /// Settings without which part of the system runs degraded.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.db_path.is_none() {
            missing.push(ENV_DB_PATH);
        }
        if self.accounts.is_empty() {
            missing.push(ENV_ACCOUNTS);
        }
        missing
    }

    /// Opens the configured store.
    ///
    /// Missing configuration or a failed open yields an uninitialized
    /// repository whose calls fail with `StoreUnavailable`.
    pub fn open_store(&self) -> SqliteRequestRepository {
        let Some(path) = self.db_path.as_ref() else {
            warn!(
                "event=store_init module=config status=skipped missing={ENV_DB_PATH}"
            );
            return SqliteRequestRepository::unavailable();
        };
        match open_db(path) {
            Ok(conn) => SqliteRequestRepository::new(conn),
            Err(err) => {
                error!("event=store_init module=config status=error error={err}");
                SqliteRequestRepository::unavailable()
            }
        }
    }

    /// Gateway seeded with the configured accounts.
    pub fn auth_gateway(&self) -> InMemoryAuthGateway {
        let mut gateway = InMemoryAuthGateway::new();
        for account in &self.accounts {
            gateway.register(&account.email, &account.password);
        }
        gateway
    }
}

fn parse_accounts(raw: &str) -> Result<Vec<AccountSeed>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .map(|(index, entry)| {
            let (email, password) = entry
                .split_once(':')
                .ok_or(ConfigError::MalformedAccount { index })?;
            let email = email.trim();
            if email.is_empty() || password.is_empty() {
                return Err(ConfigError::MalformedAccount { index });
            }
            Ok(AccountSeed {
                email: email.to_string(),
                password: password.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        ConfigError, FrontdeskConfig, DEFAULT_ADMIN_EMAIL, ENV_ACCOUNTS, ENV_ADMIN_EMAIL,
        ENV_DB_PATH,
    };
    use crate::repo::request_repo::{RepoError, RequestQuery, RequestRepository};
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<FrontdeskConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        FrontdeskConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[(ENV_ADMIN_EMAIL, "   ")]).unwrap();
        assert_eq!(config.admin_email, DEFAULT_ADMIN_EMAIL);
        assert_eq!(config.db_path, None);
        assert_eq!(config.missing_keys(), vec![ENV_DB_PATH, ENV_ACCOUNTS]);
    }

    #[test]
    fn missing_db_path_yields_unavailable_store() {
        let store = config(&[]).unwrap().open_store();
        assert!(!store.is_available());
        assert!(matches!(
            store.query(&RequestQuery::default()),
            Err(RepoError::StoreUnavailable)
        ));
    }

    #[test]
    fn accounts_parse_and_seed_gateway() {
        let config = config(&[(
            ENV_ACCOUNTS,
            "admin@prefeitura.local:r00t, desk@prefeitura.local:a:b",
        )])
        .unwrap();
        assert_eq!(config.accounts.len(), 2);
        assert_eq!(config.accounts[1].password, "a:b");
        assert_eq!(config.auth_gateway().account_count(), 2);
        assert!(!format!("{:?}", config.accounts[0]).contains("r00t"));
    }

    #[test]
    fn malformed_account_is_rejected() {
        let err = config(&[(ENV_ACCOUNTS, "ok@x:pw,broken")]).unwrap_err();
        assert_eq!(err, ConfigError::MalformedAccount { index: 1 });
    }
}
