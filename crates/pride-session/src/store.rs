//! Session storage: the key-value capability the manager sits on.
//!
//! [`SessionStore`] is the seam between expiry policy (in
//! [`SessionManager`](crate::SessionManager)) and where sessions actually
//! live. [`MemoryStore`] keeps them in process memory, which means a
//! restart logs everybody out and multiple server instances don't share
//! logins. A shared store (Redis, a database table) can be plugged in
//! behind the same trait.
//!
//! # Atomicity
//!
//! Every method is a single atomic step with respect to the others.
//! The manager never needs more than one step per key, so no
//! cross-key transaction support is required.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::Session;

/// Keyed storage for sessions, indexed by token.
///
/// `Send + Sync` because a single store is shared by every request
/// handler running on the server.
pub trait SessionStore: Send + Sync + 'static {
    /// Inserts `session` under its token unless that token is already
    /// taken. Returns `false` (and stores nothing) on a collision.
    fn insert_new(&self, session: Session) -> bool;

    /// Returns a copy of the session stored under `token`, if any.
    /// Does not look at expiry.
    fn get(&self, token: &str) -> Option<Session>;

    /// Removes the session stored under `token`. Returns whether
    /// anything was removed.
    fn remove(&self, token: &str) -> bool;

    /// Removes the session under `token` only if `pred` holds for it,
    /// checked and removed under the same lock.
    fn remove_if(&self, token: &str, pred: &dyn Fn(&Session) -> bool) -> bool;

    /// Keeps only sessions for which `keep` returns `true`.
    /// Returns how many were removed.
    fn retain(&self, keep: &dyn Fn(&Session) -> bool) -> usize;

    /// Number of stored sessions, expired ones included.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process session store: a `HashMap` behind one mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock can't leave the map half-updated
    // (every mutation is a single HashMap call), so a poisoned lock is
    // still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemoryStore {
    fn insert_new(&self, session: Session) -> bool {
        let mut sessions = self.lock();
        if sessions.contains_key(&session.token) {
            return false;
        }
        sessions.insert(session.token.clone(), session);
        true
    }

    fn get(&self, token: &str) -> Option<Session> {
        self.lock().get(token).cloned()
    }

    fn remove(&self, token: &str) -> bool {
        self.lock().remove(token).is_some()
    }

    fn remove_if(&self, token: &str, pred: &dyn Fn(&Session) -> bool) -> bool {
        let mut sessions = self.lock();
        match sessions.get(token) {
            Some(session) if pred(session) => {
                sessions.remove(token);
                true
            }
            _ => false,
        }
    }

    fn retain(&self, keep: &dyn Fn(&Session) -> bool) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| keep(session));
        before - sessions.len()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}
