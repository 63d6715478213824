//! HTTP routes for the CMS login flow and template messaging.
//!
//! Every handler is thin: pull the session out of the cookie, call into
//! the session or template layer, and shape the JSON.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use pride_session::{CookieConfig, Session, SessionStore};
use pride_template::Template;

use crate::api::{
    LoginRequest, LogoutResponse, SendTemplateRequest, SendTemplateResponse, SessionInfo,
};
use crate::auth::CredentialVerifier;
use crate::delivery::{MessageSender, OutboundMessage, normalize_phone};
use crate::server::AppState;
use crate::ApiError;

type SharedState<V, S, St> = Arc<AppState<V, S, St>>;

/// Builds the application router over `state`.
pub fn router<V, S, St>(state: SharedState<V, S, St>) -> Router
where
    V: CredentialVerifier,
    S: MessageSender,
    St: SessionStore,
{
    Router::new()
        .route("/healthz", get(health))
        .route("/api/cms/login", post(login::<V, S, St>))
        .route("/api/cms/logout", post(logout::<V, S, St>))
        .route("/api/cms/session", get(current_session))
        .route("/api/whatsapp/templates", get(list_templates::<V, S, St>))
        .route("/api/whatsapp/send", post(send_template::<V, S, St>))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Session extraction
// ---------------------------------------------------------------------------

/// The caller's live session. Rejects with 401 if there isn't one.
pub struct CurrentSession(pub Session);

impl<V, S, St> FromRequestParts<SharedState<V, S, St>> for CurrentSession
where
    V: CredentialVerifier,
    S: MessageSender,
    St: SessionStore,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState<V, S, St>,
    ) -> Result<Self, Self::Rejection> {
        let token = cookie_token(&parts.headers, &state.cookie).ok_or(ApiError::Unauthorized)?;
        state
            .sessions
            .lookup(token)
            .map(CurrentSession)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Finds the session token across all `Cookie` headers.
fn cookie_token<'a>(headers: &'a HeaderMap, cookie: &CookieConfig) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|header| cookie.token_from_header(header))
}

// ---------------------------------------------------------------------------
// CMS auth
// ---------------------------------------------------------------------------

async fn health() -> &'static str {
    "ok"
}

/// POST /api/cms/login
async fn login<V, S, St>(
    State(state): State<SharedState<V, S, St>>,
    headers: HeaderMap,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    V: CredentialVerifier,
    S: MessageSender,
    St: SessionStore,
{
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let username = request.username.trim();
    if username.is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".into(),
        ));
    }

    let account = match state.verifier.verify(username, &request.password).await {
        Ok(account) => account,
        Err(e) => {
            tracing::warn!(%username, error = %e, "CMS login refused");
            return Err(e.into());
        }
    };

    // A browser logging in again drops whatever session it had.
    if let Some(previous) = cookie_token(&headers, &state.cookie) {
        state.sessions.revoke(previous);
    }

    let token = state.sessions.create(&account.username, account.role);
    let session = state.sessions.lookup(&token).ok_or(ApiError::Unauthorized)?;

    let max_age = session.remaining_at(session.created_at);
    let set_cookie = state.cookie.set_cookie(&token, max_age);

    Ok(([(SET_COOKIE, set_cookie)], Json(SessionInfo::from(&session))))
}

/// POST /api/cms/logout
///
/// Always succeeds, logged in or not.
async fn logout<V, S, St>(
    State(state): State<SharedState<V, S, St>>,
    headers: HeaderMap,
) -> impl IntoResponse
where
    V: CredentialVerifier,
    S: MessageSender,
    St: SessionStore,
{
    if let Some(token) = cookie_token(&headers, &state.cookie) {
        state.sessions.revoke(token);
    }

    (
        [(SET_COOKIE, state.cookie.clear_cookie())],
        Json(LogoutResponse { ok: true }),
    )
}

/// GET /api/cms/session
async fn current_session(CurrentSession(session): CurrentSession) -> Json<SessionInfo> {
    Json(SessionInfo::from(&session))
}

// ---------------------------------------------------------------------------
// WhatsApp templates
// ---------------------------------------------------------------------------

/// GET /api/whatsapp/templates
async fn list_templates<V, S, St>(
    State(state): State<SharedState<V, S, St>>,
    _session: CurrentSession,
) -> Json<Vec<Template>>
where
    V: CredentialVerifier,
    S: MessageSender,
    St: SessionStore,
{
    Json(state.templates.iter().cloned().collect())
}

/// POST /api/whatsapp/send
async fn send_template<V, S, St>(
    State(state): State<SharedState<V, S, St>>,
    CurrentSession(session): CurrentSession,
    payload: Result<Json<SendTemplateRequest>, JsonRejection>,
) -> Result<Json<SendTemplateResponse>, ApiError>
where
    V: CredentialVerifier,
    S: MessageSender,
    St: SessionStore,
{
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let template = state
        .templates
        .get(&request.template_id)
        .ok_or_else(|| ApiError::UnknownTemplate(request.template_id.clone()))?;

    let to = normalize_phone(&request.to)
        .ok_or_else(|| ApiError::InvalidPhone(request.to.clone()))?;
    let body = template.render(&request.params)?;

    let message = OutboundMessage {
        to,
        template_id: template.id.clone(),
        params: request.params,
        body,
    };
    let message_id = state.sender.send(&message).await?;

    tracing::info!(
        sent_by = %session.username,
        template = %message.template_id,
        %message_id,
        "template message sent"
    );

    Ok(Json(SendTemplateResponse {
        message_id,
        to: message.to,
        body: message.body,
    }))
}
