//! CMS session management for Study With Pride.
//!
//! This crate owns the lifecycle of CMS logins:
//!
//! 1. **Minting**: a random token per successful login ([`SessionManager::create`])
//! 2. **Checking**: token to `{username, role, expiry}` ([`SessionManager::lookup`])
//! 3. **Revoking**: logout ([`SessionManager::revoke`])
//! 4. **Cookie binding**: carrying the token in a browser cookie ([`CookieConfig`])
//!
//! # How it fits in the stack
//!
//! ```text
//! HTTP routes (pride)  ← reads the cookie, asks "who is this?"
//!     ↕
//! Session layer (this crate)  ← tokens, roles, expiry
//!     ↕
//! SessionStore  ← where sessions live (in memory by default)
//! ```

mod cookie;
mod error;
mod manager;
mod session;
mod store;

pub use cookie::{CookieConfig, SameSite};
pub use error::SessionError;
pub use manager::{SessionManager, TOKEN_BYTES, TOKEN_LEN};
pub use session::{Role, Session, SessionConfig};
pub use store::{MemoryStore, SessionStore};
