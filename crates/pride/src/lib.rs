//! # Study With Pride server
//!
//! HTTP API for the CMS login flow and WhatsApp template messaging.
//!
//! The interesting logic lives in the sub-crates:
//! - [`pride_session`]: session tokens, expiry, cookie binding
//! - [`pride_template`]: the template catalog and `{{n}}` expansion
//! - [`pride_sweep`]: optional background expiry sweep
//!
//! This crate wires them to axum routes and to the two collaborators the
//! deployment provides: a [`CredentialVerifier`] for logins and a
//! [`MessageSender`] for outbound messages.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pride::{LogSender, PrideServerBuilder, ServerConfig, StaticCredentials};
//!
//! # async fn start() -> Result<(), pride::PrideError> {
//! let config = ServerConfig::from_env()?;
//! let verifier = StaticCredentials::new(config.accounts.clone());
//! let server = PrideServerBuilder::new()
//!     .config(config)
//!     .build(verifier, LogSender)
//!     .await?;
//! server.run().await
//! # }
//! ```

#![allow(async_fn_in_trait)]

pub mod api;
mod auth;
mod config;
mod delivery;
mod error;
mod handler;
mod server;

pub use auth::{Account, AuthError, CmsAccount, CredentialVerifier, StaticCredentials};
pub use config::{ConfigError, ServerConfig};
pub use delivery::{DeliveryError, LogSender, MessageSender, OutboundMessage, normalize_phone};
pub use error::{ApiError, PrideError};
pub use handler::{CurrentSession, router};
pub use server::{AppState, PrideServer, PrideServerBuilder};

pub use pride_session as session;
pub use pride_template as template;
