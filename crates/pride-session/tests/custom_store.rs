//! The manager's expiry policy must hold for any `SessionStore`, not
//! just the built-in one. This wraps `MemoryStore` and counts calls.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, TimeDelta, Utc};
use pride_session::{MemoryStore, Role, Session, SessionConfig, SessionManager, SessionStore};

#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    removals: AtomicUsize,
}

impl SessionStore for CountingStore {
    fn insert_new(&self, session: Session) -> bool {
        self.inner.insert_new(session)
    }

    fn get(&self, token: &str) -> Option<Session> {
        self.inner.get(token)
    }

    fn remove(&self, token: &str) -> bool {
        self.removals.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(token)
    }

    fn remove_if(&self, token: &str, pred: &dyn Fn(&Session) -> bool) -> bool {
        let removed = self.inner.remove_if(token, pred);
        if removed {
            self.removals.fetch_add(1, Ordering::SeqCst);
        }
        removed
    }

    fn retain(&self, keep: &dyn Fn(&Session) -> bool) -> usize {
        self.inner.retain(keep)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-06-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

#[test]
fn test_expired_lookup_deletes_through_store() {
    let mgr = SessionManager::with_store(SessionConfig::default(), CountingStore::default());
    let token = mgr.create_at("admin", Role::Admin, t0());

    assert!(mgr.lookup_at(&token, t0() + TimeDelta::days(2)).is_none());
    assert!(mgr.lookup_at(&token, t0() + TimeDelta::days(2)).is_none());

    assert!(mgr.is_empty());
    assert_eq!(mgr.store().removals.load(Ordering::SeqCst), 1, "deleted exactly once");
}

#[test]
fn test_live_lookup_never_removes() {
    let mgr = SessionManager::with_store(SessionConfig::default(), CountingStore::default());
    let token = mgr.create_at("editor", Role::ContentApprover, t0());

    for minutes in [0, 1, 60, 60 * 23] {
        let session = mgr.lookup_at(&token, t0() + TimeDelta::minutes(minutes));
        assert_eq!(session.map(|s| s.username), Some("editor".to_string()));
    }

    assert_eq!(mgr.len(), 1);
    assert_eq!(mgr.store().removals.load(Ordering::SeqCst), 0);
}

#[test]
fn test_revoke_unknown_token_is_harmless() {
    let mgr = SessionManager::with_store(SessionConfig::default(), CountingStore::default());
    let token = mgr.create("admin", Role::Admin);

    mgr.revoke("ffff");
    mgr.revoke(&token);
    mgr.revoke(&token);

    assert!(mgr.lookup(&token).is_none());
    assert!(mgr.is_empty());
}
