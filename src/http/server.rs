//! Local HTTP host for the gate.
//!
//! # Responsibilities
//! - Turn every inbound HTTP request into one gate invocation
//! - Give each invocation a deadline and a request ID
//! - Map gate errors to gateway status codes
//! - Stop accepting and drain on shutdown

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GateConfig;
use crate::gate::{Gate, GateError, InboundRequest};

/// Slack between the invocation deadline and the host's hard timeout, so
/// the gate reports an expired deadline before the host gives up.
pub const HOST_TIMEOUT_GRACE: Duration = Duration::from_secs(1);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gate: Gate,
    pub invocation_timeout: Duration,
}

/// HTTP front for the gate.
pub struct GateServer {
    router: Router,
    config: GateConfig,
}

impl GateServer {
    pub fn new(config: GateConfig, gate: Gate) -> Self {
        let state = AppState {
            gate,
            invocation_timeout: config.invocation_timeout(),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    #[allow(deprecated)]
    fn build_router(config: &GateConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(gate_handler))
            .route("/{*path}", any(gate_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(invocation_span))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(
                        config.invocation_timeout() + HOST_TIMEOUT_GRACE,
                    )),
            )
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            check = %self.config.check_name,
            "Gate server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Gate server stopped");
        Ok(())
    }
}

fn invocation_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    tracing::info_span!(
        "gate_invocation",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    )
}

async fn gate_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    let inbound = InboundRequest::new(uri.path())
        .with_method(method.as_str())
        .with_deadline(Instant::now() + state.invocation_timeout);

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %inbound.path,
        "Gate invocation"
    );

    match state.gate.handle(&inbound).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Gate invocation failed");
            e.into_response()
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = match &self {
            GateError::DeadlineExceeded { .. } => StatusCode::GATEWAY_TIMEOUT,
            GateError::Oracle { .. } => StatusCode::BAD_GATEWAY,
        };
        (status, self.to_string()).into_response()
    }
}
