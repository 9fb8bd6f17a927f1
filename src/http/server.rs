//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum Router: one handler bound to one Relay
//! - Log every inbound request
//! - Bind server to listener and run until shutdown

use std::future::Future;
use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::http::relay::Relay;
use crate::lifecycle::signals::shutdown_signal;
use crate::net::listener::ListenerError;

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
}

/// HTTP front end of the proxy.
pub struct ProxyServer {
    router: Router,
}

impl ProxyServer {
    pub fn new(relay: Relay) -> Self {
        let router = Self::build_router(AppState { relay });
        Self { router }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for driving the proxy without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> Result<(), ListenerError> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Serve until `signal` resolves, then drain in-flight requests.
    pub async fn run_until<F>(self, listener: TcpListener, signal: F) -> Result<(), ListenerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await
            .map_err(ListenerError::Serve)?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    tracing::info!(
        method = %request.method(),
        uri = %request.uri(),
        "Request received"
    );

    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    state.relay.forward(request, client_ip).await
}
