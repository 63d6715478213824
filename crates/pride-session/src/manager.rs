//! The session manager: sole authority on "who is logged in".
//!
//! Responsibilities:
//! - Minting a token when a login succeeds
//! - Answering lookups, dropping sessions that have expired
//! - Revoking tokens on logout
//!
//! # Expiry policy
//!
//! Expiry is lazy: an expired session stays in the store until the next
//! lookup of that exact token deletes it. Abandoned sessions therefore
//! linger, bounded by the login rate. [`SessionManager::sweep_expired`]
//! exists for deployments that want to reclaim them periodically; it
//! removes nothing a lookup wouldn't also refuse to return.
//!
//! # Concurrency note
//!
//! Unlike a single-owner registry, `SessionManager` takes `&self`
//! everywhere and is shared across request handlers as-is (usually in
//! an `Arc`). Locking is the store's job; see [`SessionStore`].

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;

use crate::{MemoryStore, Role, Session, SessionConfig, SessionStore};

/// Number of random bytes in a session token (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// Length of a session token in hex characters.
pub const TOKEN_LEN: usize = TOKEN_BYTES * 2;

/// Mints, validates and revokes CMS session tokens.
///
/// ## Lifecycle
///
/// ```text
/// create() ──→ [active] ──lookup() before expiry──→ [active]
///                 │
///                 ├──revoke()──────────────→ [absent]
///                 │
///                 └──lookup() after expiry─→ [absent]
/// ```
///
/// There is no way back from expiry: an expired token is deleted the
/// first time anyone asks about it and never matches again.
pub struct SessionManager<S: SessionStore = MemoryStore> {
    store: S,
    ttl: TimeDelta,
}

impl SessionManager<MemoryStore> {
    /// Creates a manager backed by an in-process [`MemoryStore`].
    pub fn new(config: SessionConfig) -> Self {
        Self::with_store(config, MemoryStore::new())
    }
}

impl<S: SessionStore> SessionManager<S> {
    /// Creates a manager on top of the given store.
    pub fn with_store(config: SessionConfig, store: S) -> Self {
        // A ttl too large for chrono is clamped; nobody configures
        // sessions that outlive the calendar.
        let ttl = TimeDelta::from_std(config.ttl).unwrap_or(TimeDelta::MAX);
        Self { store, ttl }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The configured session lifetime.
    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Creates a session for `username` with `role` and returns its token.
    ///
    /// Never fails. The token is regenerated on the off chance it
    /// collides with one already stored.
    pub fn create(&self, username: &str, role: Role) -> String {
        self.create_at(username, role, Utc::now())
    }

    /// [`create`](Self::create) with an explicit clock reading.
    pub fn create_at(
        &self,
        username: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> String {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        loop {
            let token = generate_token();
            let session = Session {
                token: token.clone(),
                username: username.to_string(),
                role,
                created_at: now,
                expires_at,
            };

            if self.store.insert_new(session) {
                tracing::info!(
                    %username,
                    %role,
                    %expires_at,
                    "session created"
                );
                tracing::debug!(token = token_prefix(&token), "issued session token");
                return token;
            }

            tracing::warn!("session token collision, regenerating");
        }
    }

    /// Returns the session for `token` if it exists and hasn't expired.
    ///
    /// An expired session is deleted as a side effect and reported as
    /// absent, so every later lookup misses too.
    pub fn lookup(&self, token: &str) -> Option<Session> {
        self.lookup_at(token, Utc::now())
    }

    /// [`lookup`](Self::lookup) with an explicit clock reading.
    pub fn lookup_at(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
        let session = self.store.get(token)?;

        if !session.is_expired_at(now) {
            return Some(session);
        }

        if self.store.remove_if(token, &|s| s.is_expired_at(now)) {
            tracing::info!(
                username = %session.username,
                "session expired, removed on lookup"
            );
        }
        None
    }

    /// Removes `token` from the store.
    ///
    /// Idempotent: revoking an unknown or already-revoked token is a
    /// no-op.
    pub fn revoke(&self, token: &str) {
        if self.store.remove(token) {
            tracing::info!(token = token_prefix(token), "session revoked");
        }
    }

    /// Deletes every session that has expired. Returns how many went.
    ///
    /// Optional housekeeping; correctness never depends on it.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Utc::now())
    }

    /// [`sweep_expired`](Self::sweep_expired) with an explicit clock reading.
    pub fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        let removed = self.store.retain(&|s| !s.is_expired_at(now));
        if removed > 0 {
            tracing::info!(removed, "swept expired sessions");
        }
        removed
    }

    /// Number of stored sessions, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl Default for SessionManager<MemoryStore> {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// Generates a random session token: [`TOKEN_BYTES`] bytes as lowercase hex.
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; TOKEN_BYTES] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// First few characters of a token, enough to correlate log lines.
fn token_prefix(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}

// =========================================================================
// Tests
// =========================================================================
