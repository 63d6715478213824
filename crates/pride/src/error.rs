//! Error types for the server.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pride_template::TemplateError;
use serde::Serialize;

use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::delivery::DeliveryError;

/// Top-level error for starting and running the server.
///
/// Each variant wraps a crate- or module-specific error; `#[from]`
/// lets `?` convert them.
#[derive(Debug, thiserror::Error)]
pub enum PrideError {
    /// Configuration couldn't be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The template catalog failed validation at startup.
    #[error("invalid template catalog: {0}")]
    Template(#[from] TemplateError),

    /// Binding or serving failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A request failed; rendered as a JSON error body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body or a field in it is malformed.
    #[error("{0}")]
    BadRequest(String),

    /// No valid session cookie.
    #[error("not logged in")]
    Unauthorized,

    /// Login refused, or the verifier is down.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The requested template id isn't in the catalog.
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    /// Wrong number of template parameters.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The recipient number isn't a usable phone number.
    #[error("invalid phone number: {0}")]
    InvalidPhone(String),

    /// The delivery channel refused or couldn't take the message.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_)
            | Self::UnknownTemplate(_)
            | Self::Template(_)
            | Self::InvalidPhone(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized | Self::Auth(AuthError::InvalidCredentials) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Auth(AuthError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Delivery(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Auth(AuthError::InvalidCredentials) => "invalid_credentials",
            Self::Auth(AuthError::Unavailable(_)) => "auth_unavailable",
            Self::UnknownTemplate(_) => "unknown_template",
            Self::Template(_) => "invalid_parameters",
            Self::InvalidPhone(_) => "invalid_phone",
            Self::Delivery(_) => "delivery_failed",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_error() {
        let err: PrideError = ConfigError::NoAccounts.into();
        assert!(matches!(err, PrideError::Config(_)));
        assert_eq!(err.to_string(), "no CMS account configured");
    }

    #[test]
    fn test_from_template_error() {
        let err: PrideError = TemplateError::DuplicateId("x".into()).into();
        assert!(matches!(err, PrideError::Template(_)));
    }

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::Unavailable("db".into())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::UnknownTemplate("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(DeliveryError::Unavailable("down".into())).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_api_error_codes() {
        let err = ApiError::from(TemplateError::ArgumentCount {
            id: "visa_ready".into(),
            expected: 2,
            got: 1,
        });
        assert_eq!(err.code(), "invalid_parameters");
        assert_eq!(ApiError::InvalidPhone("x".into()).code(), "invalid_phone");
    }
}
