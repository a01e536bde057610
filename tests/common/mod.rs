//! Shared utilities for integration testing.

use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::Value;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use flagprobe::config::Config;
use flagprobe::gate::{Gate, OracleLog, SidecarOracle};
use flagprobe::http::GateServer;
use flagprobe::lifecycle::Shutdown;

/// Start a programmable HTTP backend on an ephemeral port.
///
/// `f` returns the status line (e.g. "200 OK") and body for each request.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (&'static str, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let mut request = [0u8; 1024];
                let _ = socket.read(&mut request).await;

                let (status_line, body) = f().await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub fn refused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// A fault-injection sidecar stand-in that records every experiment query.
#[allow(dead_code)]
pub struct MockSidecar {
    pub addr: SocketAddr,
    pub queries: Arc<Mutex<Vec<Value>>>,
}

#[allow(dead_code)]
impl MockSidecar {
    pub fn url(&self) -> String {
        format!("http://{}/experiment", self.addr)
    }

    pub fn queries(&self) -> Vec<Value> {
        self.queries.lock().unwrap().clone()
    }
}

#[allow(dead_code)]
pub async fn start_mock_sidecar(status: u16, body: &'static str, delay: Duration) -> MockSidecar {
    let queries = Arc::new(Mutex::new(Vec::new()));
    let recorded = queries.clone();

    let app = Router::new().route(
        "/experiment",
        post(move |Json(query): Json<Value>| {
            let recorded = recorded.clone();
            async move {
                recorded.lock().unwrap().push(query);
                tokio::time::sleep(delay).await;
                (StatusCode::from_u16(status).unwrap(), body)
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockSidecar { addr, queries }
}

/// Serve a gate wired to the sidecar oracle; returns its address and a stop handle.
#[allow(dead_code)]
pub async fn start_gate(config: Config) -> (SocketAddr, Shutdown) {
    let oracle = SidecarOracle::new(&config.oracle).unwrap();
    let gate = Gate::new(&config.gate, Arc::new(oracle), OracleLog::new(true));
    let server = GateServer::new(config.gate.clone(), gate);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
