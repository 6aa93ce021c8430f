//! Gateway server implementation.
//!
//! Builds the axum router and binds it to a listener.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};

use super::handler::{health, relay};
use super::routes::RouteTable;
use super::target::UpstreamTarget;
use crate::adapters::{EnvBearer, ReqwestUpstreamClient, StaticBearer};
use crate::config::{GatewayConfig, API_KEY_ENV, DEFAULT_MAX_BODY_BYTES};
use crate::error::GatewayError;
use crate::traits::{UpstreamAuthenticator, UpstreamClient};

/// Shared state for the relay handlers.
///
/// Read-only once built; request handling never mutates it.
#[derive(Clone)]
pub struct GatewayState {
    /// Client used for every upstream call
    pub upstream: Arc<dyn UpstreamClient>,
    /// Source of the bearer credential
    pub auth: Arc<dyn UpstreamAuthenticator>,
    pub target: Arc<UpstreamTarget>,
    pub routes: Arc<RouteTable>,
    pub max_body_bytes: usize,
}

impl GatewayState {
    pub fn new(
        upstream: Arc<dyn UpstreamClient>,
        auth: Arc<dyn UpstreamAuthenticator>,
        target: UpstreamTarget,
    ) -> Self {
        Self {
            upstream,
            auth,
            target: Arc::new(target),
            routes: Arc::new(RouteTable::default()),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = Arc::new(routes);
        self
    }

    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    /// Production state: reqwest upstream client and the configured credential.
    ///
    /// With `rotate_api_key` set the credential is read from
    /// [`API_KEY_ENV`] on every request; otherwise `api_key` is used as loaded.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let target = UpstreamTarget::new(&config.upstream_url)?;
        let routes = config
            .stream_paths
            .iter()
            .fold(RouteTable::default(), |table, path| {
                table.with_streaming_path(path)
            });

        let auth: Arc<dyn UpstreamAuthenticator> = if config.rotate_api_key {
            Arc::new(EnvBearer::new(API_KEY_ENV))
        } else {
            Arc::new(StaticBearer::from_option(config.api_key.clone()))
        };

        Ok(Self::new(Arc::new(ReqwestUpstreamClient::new()), auth, target)
        .with_routes(routes)
        .with_max_body_bytes(config.max_body_bytes))
    }
}

/// Build the gateway router.
///
/// `/health` is answered locally; every other request is relayed. All
/// responses carry allow-all CORS headers.
pub fn build_router(state: GatewayState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .fallback(relay)
        .layer(cors)
        .with_state(state)
}

/// Start the gateway on a specific address.
///
/// Binding to port 0 picks a free port; the bound address is returned.
pub async fn start_gateway_on(
    addr: SocketAddr,
    state: GatewayState,
) -> color_eyre::Result<(JoinHandle<()>, SocketAddr)> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;
    let app = build_router(state);

    tracing::info!("Relay gateway listening on http://{}", actual_addr);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Relay gateway error: {}", e);
        }
    });

    Ok((handle, actual_addr))
}

/// Serve the gateway until `shutdown` resolves, then drain open connections.
pub async fn serve_until<F>(
    addr: SocketAddr,
    state: GatewayState,
    shutdown: F,
) -> color_eyre::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Relay gateway listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Relay gateway stopped");
    Ok(())
}
