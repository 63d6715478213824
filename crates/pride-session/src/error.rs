//! Error types for the session layer.

/// Errors that can occur while handling session data.
///
/// Session lifecycle operations themselves never fail: an unknown or
/// expired token is a miss, not an error. What can go wrong is parsing
/// session-related input coming from outside.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The role name isn't one the CMS knows about.
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// A cookie attribute value couldn't be parsed.
    #[error("invalid SameSite value: {0}")]
    InvalidSameSite(String),
}
