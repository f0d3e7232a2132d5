//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the download handler on every path
//! - Wire up middleware (tracing, request ID)
//! - Serve plain HTTP or HTTPS until shutdown is signalled

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::any, Router};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::request::X_REQUEST_ID;
use crate::proxy::{download_handler, Forwarder};
use crate::signing::Signer;
use crate::upstream::LinkResolver;

/// Grace period for in-flight downloads after shutdown is signalled (TLS).
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state injected into handlers. Everything here is read-only.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub signer: Arc<Signer>,
    pub resolver: LinkResolver,
    pub forwarder: Forwarder,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        // Redirects are handled by the forwarder so self-redirects can be spotted.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let address = config.normalized_address();
        let resolver = LinkResolver::new(client.clone(), address, &config.token);
        let forwarder = Forwarder::new(client, address, config.outbound_user_agent());
        let signer = Arc::new(Signer::new(config.token.as_bytes()));

        Ok(Self {
            config: Arc::new(config),
            signer,
            resolver,
            forwarder,
        })
    }
}

/// HTTP server for the download proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let state = AppState::new(config)?;
        let config = state.config.clone();
        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(download_handler))
            .route("/{*path}", any(download_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            drain.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(app)
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}
