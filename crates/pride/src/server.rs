//! `PrideServer` builder and serve loop.
//!
//! Ties the layers together: config → sessions + templates →
//! HTTP routes, plus the optional background sweep.

use std::sync::Arc;

use pride_session::{CookieConfig, MemoryStore, SessionConfig, SessionManager, SessionStore};
use pride_sweep::{SweepConfig, SweepScheduler};
use pride_template::TemplateCatalog;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::auth::CredentialVerifier;
use crate::config::ServerConfig;
use crate::delivery::MessageSender;
use crate::handler::router;
use crate::PrideError;

/// Shared state handed to every request handler.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// session manager locks internally; everything else is read-only.
/// `St` is where sessions live; the in-process [`MemoryStore`] unless a
/// shared store is plugged in.
pub struct AppState<V, S, St = MemoryStore>
where
    V: CredentialVerifier,
    S: MessageSender,
    St: SessionStore,
{
    pub sessions: SessionManager<St>,
    pub cookie: CookieConfig,
    pub templates: TemplateCatalog,
    pub verifier: V,
    pub sender: S,
}

impl<V, S, St> AppState<V, S, St>
where
    V: CredentialVerifier,
    S: MessageSender,
    St: SessionStore,
{
    pub fn new(
        sessions: SessionManager<St>,
        cookie: CookieConfig,
        templates: TemplateCatalog,
        verifier: V,
        sender: S,
    ) -> Self {
        Self {
            sessions,
            cookie,
            templates,
            verifier,
            sender,
        }
    }
}

/// Builder for configuring and starting the server.
///
/// # Example
///
/// ```rust,ignore
/// let server = PrideServerBuilder::new()
///     .config(ServerConfig::from_env()?)
///     .build(verifier, LogSender)
///     .await?;
/// server.run().await
/// ```
pub struct PrideServerBuilder {
    bind_addr: String,
    session_config: SessionConfig,
    cookie_config: CookieConfig,
    sweep_config: SweepConfig,
}

impl PrideServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            session_config: SessionConfig::default(),
            cookie_config: CookieConfig::default(),
            sweep_config: SweepConfig::default(),
        }
    }

    /// Takes every setting from a loaded [`ServerConfig`].
    ///
    /// Accounts aren't used here; they go into the verifier passed to
    /// [`build`](Self::build).
    pub fn config(self, config: ServerConfig) -> Self {
        Self {
            bind_addr: config.bind_addr,
            session_config: config.session,
            cookie_config: config.cookie,
            sweep_config: config.sweep,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Sets how the session cookie is named and flagged.
    pub fn cookie_config(mut self, config: CookieConfig) -> Self {
        self.cookie_config = config;
        self
    }

    /// Sets the background sweep schedule.
    pub fn sweep_config(mut self, config: SweepConfig) -> Self {
        self.sweep_config = config;
        self
    }

    /// Builds a server keeping sessions in memory.
    ///
    /// # Errors
    /// See [`build_with_store`](Self::build_with_store).
    pub async fn build<V, S>(self, verifier: V, sender: S) -> Result<PrideServer<V, S>, PrideError>
    where
        V: CredentialVerifier,
        S: MessageSender,
    {
        self.build_with_store(verifier, sender, MemoryStore::new()).await
    }

    /// Validates the template catalog and binds the listener, keeping
    /// sessions in `store`.
    ///
    /// # Errors
    /// - [`PrideError::Template`] if the built-in catalog is inconsistent
    /// - [`PrideError::Io`] if the address can't be bound
    pub async fn build_with_store<V, S, St>(
        self,
        verifier: V,
        sender: S,
        store: St,
    ) -> Result<PrideServer<V, S, St>, PrideError>
    where
        V: CredentialVerifier,
        S: MessageSender,
        St: SessionStore,
    {
        let templates = TemplateCatalog::builtin()?;
        let listener = TcpListener::bind(&self.bind_addr).await?;

        let state = Arc::new(AppState::new(
            SessionManager::with_store(self.session_config, store),
            self.cookie_config,
            templates,
            verifier,
            sender,
        ));

        Ok(PrideServer {
            listener,
            state,
            sweep: self.sweep_config,
        })
    }
}

impl Default for PrideServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound server, ready to [`run`](Self::run).
pub struct PrideServer<V, S, St = MemoryStore>
where
    V: CredentialVerifier,
    S: MessageSender,
    St: SessionStore,
{
    listener: TcpListener,
    state: Arc<AppState<V, S, St>>,
    sweep: SweepConfig,
}

impl<V, S, St> PrideServer<V, S, St>
where
    V: CredentialVerifier,
    S: MessageSender,
    St: SessionStore,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// The shared state, e.g. to inspect sessions from tests.
    pub fn state(&self) -> &Arc<AppState<V, S, St>> {
        &self.state
    }

    /// Serves requests until Ctrl-C.
    pub async fn run(self) -> Result<(), PrideError> {
        let addr = self.listener.local_addr()?;
        let sweeper = spawn_sweeper(Arc::clone(&self.state), self.sweep);

        tracing::info!(%addr, "Study With Pride server running");

        let result = axum::serve(self.listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await;

        sweeper.abort();
        tracing::info!("server stopped");
        result.map_err(PrideError::from)
    }
}

/// Spawns the session sweep loop. With sweeping disabled the task just
/// idles until aborted.
pub(crate) fn spawn_sweeper<V, S, St>(
    state: Arc<AppState<V, S, St>>,
    config: SweepConfig,
) -> JoinHandle<()>
where
    V: CredentialVerifier,
    S: MessageSender,
    St: SessionStore,
{
    tokio::spawn(async move {
        let mut scheduler = SweepScheduler::new(config);
        if scheduler.is_disabled() {
            tracing::debug!("session sweep disabled, relying on lazy expiry");
        }
        loop {
            let info = scheduler.wait_for_sweep().await;
            if info.late_by >= scheduler.interval() {
                tracing::warn!(
                    sweep = info.sweep,
                    late_ms = info.late_by.as_millis() as u64,
                    "session sweep running a full interval late"
                );
            }

            let evicted = state.sessions.sweep_expired();
            scheduler.record_sweep(evicted);

            let metrics = scheduler.metrics();
            tracing::debug!(
                sweep = info.sweep,
                evicted,
                total_evicted = metrics.total_evicted,
                remaining = state.sessions.len(),
                "session sweep complete"
            );
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
