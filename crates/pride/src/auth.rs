//! Credential check for CMS logins.
//!
//! The server doesn't decide how passwords are stored. It calls a
//! [`CredentialVerifier`] with what the login form sent and, if the
//! verifier says yes, mints a session for the returned [`Account`].
//!
//! [`StaticCredentials`] checks against the accounts in the server
//! config, which is how the CMS is deployed today (one admin, one
//! content approver).

use pride_session::Role;

/// Who a successful login turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub role: Role,
}

/// Why a login was refused.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown user or wrong password. Deliberately doesn't say which.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The verifier couldn't reach whatever backs it.
    #[error("credential check unavailable: {0}")]
    Unavailable(String),
}

/// Validates login credentials and returns the account they belong to.
///
/// `Send + Sync + 'static` because one verifier is shared by every
/// request handler for the life of the server.
pub trait CredentialVerifier: Send + Sync + 'static {
    /// Checks `username` / `password`.
    ///
    /// # Returns
    /// - `Ok(Account)`: credentials are good
    /// - `Err(AuthError::InvalidCredentials)`: they aren't
    fn verify(
        &self,
        username: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<Account, AuthError>> + Send;
}

/// A configured CMS login.
#[derive(Clone, PartialEq, Eq)]
pub struct CmsAccount {
    pub username: String,
    pub password: String,
    pub role: Role,
}

// Keep passwords out of logs and panic messages.
impl std::fmt::Debug for CmsAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CmsAccount")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Verifies against a fixed list of accounts.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    accounts: Vec<CmsAccount>,
}

impl StaticCredentials {
    pub fn new(accounts: Vec<CmsAccount>) -> Self {
        Self { accounts }
    }
}

impl CredentialVerifier for StaticCredentials {
    async fn verify(&self, username: &str, password: &str) -> Result<Account, AuthError> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.username == username)
            .ok_or(AuthError::InvalidCredentials)?;

        if !constant_time_eq(account.password.as_bytes(), password.as_bytes()) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Account {
            username: account.username.clone(),
            role: account.role,
        })
    }
}

/// Compares two byte strings without short-circuiting on the first
/// differing byte. Length is not hidden.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
