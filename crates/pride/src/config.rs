//! Server configuration from environment variables.
//!
//! | Variable                       | Default          |
//! |--------------------------------|------------------|
//! | `PRIDE_BIND`                   | `127.0.0.1:8080` |
//! | `PRIDE_SESSION_TTL_HOURS`      | `24`             |
//! | `PRIDE_SWEEP_INTERVAL_SECS`    | `0` (off)        |
//! | `PRIDE_COOKIE_SECURE`          | `false`          |
//! | `PRIDE_COOKIE_SAME_SITE`       | `lax`            |
//! | `PRIDE_CMS_ADMIN_USERNAME`     | (unset)          |
//! | `PRIDE_CMS_ADMIN_PASSWORD`     | (unset)          |
//! | `PRIDE_CMS_APPROVER_USERNAME`  | (unset)          |
//! | `PRIDE_CMS_APPROVER_PASSWORD`  | (unset)          |
//!
//! `PRIDE_SESSION_TTL_HOURS` must be between 1 and 8760 (one year). At
//! least one CMS account (username and password) must be set.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use pride_session::{CookieConfig, Role, SameSite, SessionConfig};
use pride_sweep::SweepConfig;
use tracing::info;

use crate::auth::CmsAccount;

/// Problems found while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but can't be parsed.
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    /// Only one half of a username/password pair is set.
    #[error("{missing} must be set together with {present}")]
    Incomplete {
        present: &'static str,
        missing: &'static str,
    },

    /// No CMS login configured at all.
    #[error("no CMS account configured")]
    NoAccounts,
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub session: SessionConfig,
    pub cookie: CookieConfig,
    pub sweep: SweepConfig,
    pub accounts: Vec<CmsAccount>,
}

impl ServerConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns a variable's
    /// value or `None` if unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = try_load(&lookup, "PRIDE_BIND", "127.0.0.1:8080".to_string())?;

        let ttl_hours: u64 = try_load(&lookup, "PRIDE_SESSION_TTL_HOURS", 24)?;
        if !(1..=SessionConfig::MAX_TTL_HOURS).contains(&ttl_hours) {
            return Err(ConfigError::Invalid {
                key: "PRIDE_SESSION_TTL_HOURS",
                reason: format!("must be between 1 and {}", SessionConfig::MAX_TTL_HOURS),
            });
        }

        let sweep_secs: u64 = try_load(&lookup, "PRIDE_SWEEP_INTERVAL_SECS", 0)?;
        let sweep = SweepConfig::every(Duration::from_secs(sweep_secs));

        let cookie = CookieConfig {
            secure: try_load(&lookup, "PRIDE_COOKIE_SECURE", false)?,
            same_site: try_load(&lookup, "PRIDE_COOKIE_SAME_SITE", SameSite::Lax)?,
            ..CookieConfig::default()
        };

        let accounts: Vec<CmsAccount> = [
            account(
                &lookup,
                "PRIDE_CMS_ADMIN_USERNAME",
                "PRIDE_CMS_ADMIN_PASSWORD",
                Role::Admin,
            )?,
            account(
                &lookup,
                "PRIDE_CMS_APPROVER_USERNAME",
                "PRIDE_CMS_APPROVER_PASSWORD",
                Role::ContentApprover,
            )?,
        ]
        .into_iter()
        .flatten()
        .collect();

        if accounts.is_empty() {
            return Err(ConfigError::NoAccounts);
        }

        Ok(Self {
            bind_addr,
            session: SessionConfig::with_ttl_hours(ttl_hours),
            cookie,
            sweep,
            accounts,
        })
    }
}

/// Reads and parses `key`, falling back to `default` when unset or empty.
fn try_load<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

/// Reads one username/password pair. Both unset means no account.
fn account<F>(
    lookup: &F,
    user_key: &'static str,
    pass_key: &'static str,
    role: Role,
) -> Result<Option<CmsAccount>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let username = lookup(user_key).filter(|v| !v.trim().is_empty());
    let password = lookup(pass_key).filter(|v| !v.is_empty());

    match (username, password) {
        (Some(username), Some(password)) => Ok(Some(CmsAccount {
            username: username.trim().to_string(),
            password,
            role,
        })),
        (Some(_), None) => Err(ConfigError::Incomplete {
            present: user_key,
            missing: pass_key,
        }),
        (None, Some(_)) => Err(ConfigError::Incomplete {
            present: pass_key,
            missing: user_key,
        }),
        (None, None) => Ok(None),
    }
}
