//! Loopback HTTP front end for a [`Simulator`].

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::fixtures::APP_PREFIX;
use crate::simulator::Simulator;

/// Route every request, whatever its method and path, to the simulator.
pub fn router(simulator: Arc<Simulator>) -> Router {
    Router::new().fallback(dispatch).with_state(simulator)
}

async fn dispatch(
    State(simulator): State<Arc<Simulator>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    let span = ncfs_telemetry::extract_trace_context(
        &header(ncfs_telemetry::TRACEPARENT),
        &header(ncfs_telemetry::TRACESTATE),
    );

    // Keep percent-escapes as sent: revision keys travel as `%2F`.
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let reply = span.in_scope(|| simulator.handle(method, path, &body));

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, reply.body).into_response()
}

/// A running simulator on `127.0.0.1`. Stops when dropped.
pub struct MockServer {
    addr: SocketAddr,
    simulator: Arc<Simulator>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl MockServer {
    /// Serve on an ephemeral loopback port.
    pub async fn start(simulator: Arc<Simulator>) -> io::Result<Self> {
        Self::bind(simulator, SocketAddr::from(([127, 0, 0, 1], 0))).await
    }

    pub async fn bind(simulator: Arc<Simulator>, addr: SocketAddr) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();

        let app = router(simulator.clone());
        let token = shutdown.clone();
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(token.cancelled_owned())
                .await
            {
                tracing::error!(error = %e, "mock server failed");
            }
        });

        tracing::info!(%addr, "mock server listening");
        Ok(Self {
            addr,
            simulator,
            shutdown,
            task: Some(task),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://127.0.0.1:<port>`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Driver endpoint for this server: `http://127.0.0.1:<port>/apps/sciencemesh/`.
    pub fn endpoint(&self) -> String {
        format!("{}{APP_PREFIX}", self.url())
    }

    pub fn simulator(&self) -> &Arc<Simulator> {
        &self.simulator
    }

    /// Token that stops the server when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Serve until the shutdown token fires.
    pub async fn run_until_stopped(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "mock server task panicked");
            }
        }
    }

    /// Stop and wait for in-flight requests to finish.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
