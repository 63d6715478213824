//! Session types: the record the server keeps for a logged-in CMS user.
//!
//! A session answers three questions for a request carrying a token:
//! - WHO is calling (`username`)
//! - WHAT they may do (`role`)
//! - UNTIL WHEN the answer holds (`expires_at`)

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::SessionError;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a session stays valid after creation.
    ///
    /// Default: 24 hours.
    pub ttl: Duration,
}

impl SessionConfig {
    /// The default session lifetime.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

    /// Longest lifetime, in hours, that server configuration accepts.
    pub const MAX_TTL_HOURS: u64 = 24 * 365;

    /// Creates a config with the given lifetime in hours.
    ///
    /// Saturates instead of overflowing; the session manager clamps
    /// expiry to the latest representable timestamp.
    pub fn with_ttl_hours(hours: u64) -> Self {
        Self {
            ttl: Duration::from_secs(hours.saturating_mul(60 * 60)),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Self::DEFAULT_TTL,
        }
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// What a CMS user is allowed to do.
///
/// Serialized in kebab-case (`"content-approver"`, `"admin"`) so the
/// values match what the CMS front end sends and displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Reviews and approves content changes.
    ContentApprover,
    /// Full access.
    Admin,
}

impl Role {
    /// The wire name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentApprover => "content-approver",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content-approver" => Ok(Self::ContentApprover),
            "admin" => Ok(Self::Admin),
            other => Err(SessionError::UnknownRole(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single authenticated CMS session.
///
/// Immutable once created. The store hands out clones, so holding a
/// `Session` never keeps the stored entry alive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// The opaque token identifying this session (lowercase hex).
    #[serde(skip)]
    pub token: String,

    /// Who logged in.
    pub username: String,

    /// What they may do.
    pub role: Role,

    /// When the session was minted.
    pub created_at: DateTime<Utc>,

    /// The session is valid strictly before this instant.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Returns `true` if the session is no longer valid at `now`.
    ///
    /// Validity is `now < expires_at`, so a session is already expired
    /// at the exact expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Returns `true` if the session is no longer valid right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Time left before expiry at `now`, or zero if already expired.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).to_std().unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    fn session_expiring_at(expires_at: DateTime<Utc>) -> Session {
        Session {
            token: "ab".repeat(32),
            username: "editor".into(),
            role: Role::ContentApprover,
            created_at: expires_at - TimeDelta::hours(24),
            expires_at,
        }
    }

    #[test]
    fn test_session_config_default_is_24_hours() {
        assert_eq!(SessionConfig::default().ttl, Duration::from_secs(86_400));
        assert_eq!(
            SessionConfig::with_ttl_hours(2).ttl,
            Duration::from_secs(7_200)
        );
    }

    #[test]
    fn test_with_ttl_hours_saturates_on_overflow() {
        let config = SessionConfig::with_ttl_hours(u64::MAX);

        assert_eq!(config.ttl, Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [Role::ContentApprover, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_from_str_unknown_returns_error() {
        let err = "superuser".parse::<Role>().unwrap_err();
        assert!(matches!(err, SessionError::UnknownRole(ref r) if r == "superuser"));
    }

    #[test]
    fn test_role_serializes_kebab_case() {
        let json = serde_json::to_string(&Role::ContentApprover).unwrap();
        assert_eq!(json, "\"content-approver\"");
    }

    #[test]
    fn test_is_expired_at_boundary_is_expired() {
        let now = Utc::now();
        let session = session_expiring_at(now);

        assert!(session.is_expired_at(now));
        assert!(!session.is_expired_at(now - TimeDelta::milliseconds(1)));
    }

    #[test]
    fn test_remaining_at_saturates_to_zero() {
        let now = Utc::now();
        let session = session_expiring_at(now);

        assert_eq!(
            session.remaining_at(now + TimeDelta::hours(1)),
            Duration::ZERO
        );
        assert_eq!(
            session.remaining_at(now - TimeDelta::seconds(30)),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_session_json_omits_token() {
        let session = session_expiring_at(Utc::now());
        let json = serde_json::to_value(&session).unwrap();

        assert!(json.get("token").is_none());
        assert_eq!(json["username"], "editor");
        assert_eq!(json["role"], "content-approver");
        assert!(json.get("expiresAt").is_some());
    }
}
