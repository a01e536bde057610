//! Probe transport.
//!
//! # Responsibilities
//! - Issue one GET against the probe target
//! - Hand back the status line and nothing else
//!
//! # Design Decisions
//! - The response (and its body) is dropped as soon as the status is read,
//!   on every path; the body is never consumed
//! - Non-2xx statuses are responses, not errors

use async_trait::async_trait;
use axum::body::Body;
use hyper::{Method, Request, StatusCode, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// Failure to obtain any response from the target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request could not be built (bad URI, header, ...).
    #[error("invalid probe request: {0}")]
    InvalidRequest(String),

    /// The connection failed or broke before a response arrived.
    #[error("{0}")]
    Connect(String),

    /// No response within the probe timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// The part of a response a probe cycle looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: StatusCode,
}

impl ProbeResponse {
    pub fn new(status: StatusCode) -> Self {
        Self { status }
    }

    /// Status line in the form "200 OK".
    pub fn status_text(&self) -> String {
        match self.status.canonical_reason() {
            Some(reason) => format!("{} {}", self.status.as_u16(), reason),
            None => self.status.as_u16().to_string(),
        }
    }
}

/// Network seam used by the prober.
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    async fn get(&self, target: &Uri) -> Result<ProbeResponse, TransportError>;
}

/// Plain HTTP/1.1 transport on the hyper-util legacy client.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Body>,
    user_agent: String,
}

impl HyperTransport {
    pub fn new(user_agent: impl Into<String>) -> Self {
        // No idle pooling: every cycle measures a fresh connection.
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(HttpConnector::new());

        Self {
            client,
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl ProbeTransport for HyperTransport {
    async fn get(&self, target: &Uri) -> Result<ProbeResponse, TransportError> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(target.clone())
            .header("user-agent", &self.user_agent)
            .body(Body::empty())
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| TransportError::Connect(describe(&e)))?;

        let status = response.status();
        drop(response);

        Ok(ProbeResponse::new(status))
    }
}

/// Flatten an error and its sources into one line.
pub(crate) fn describe(error: &(dyn StdError + 'static)) -> String {
    let mut description = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !description.contains(&text) {
            description.push_str(": ");
            description.push_str(&text);
        }
        source = cause.source();
    }
    description
}
