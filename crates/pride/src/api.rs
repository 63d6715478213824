//! JSON request and response bodies.
//!
//! Field names are camelCase to match what the CMS and recruiter
//! dashboard front ends already send and read.

use chrono::{DateTime, Utc};
use pride_session::{Role, Session};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// The current session, as the front end sees it. Never includes the
/// token; that only travels in the cookie.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub username: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

impl From<&Session> for SessionInfo {
    fn from(session: &Session) -> Self {
        Self {
            username: session.username.clone(),
            role: session.role,
            expires_at: session.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub ok: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTemplateRequest {
    pub template_id: String,
    pub to: String,
    #[serde(default)]
    pub params: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTemplateResponse {
    pub message_id: String,
    pub to: String,
    pub body: String,
}
