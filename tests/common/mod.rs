//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{HeaderMap, Method, Response, StatusCode, Uri},
    Router,
};
use futures_util::future::{BoxFuture, FutureExt};
use request_redirector::config::{FallbackConfig, MountConfig, ProxyConfig, UpstreamConfig};
use request_redirector::{HttpServer, Shutdown, Transport, TransportError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

pub const MOUNT: &str = "/api/redirector";
pub const UPSTREAM: &str = "Redirector";

/// A request as the upstream saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

pub type Recordings = Arc<Mutex<Vec<Recorded>>>;

/// Fixed answer returned by a mock upstream.
#[derive(Debug, Clone)]
pub struct Canned {
    pub status: StatusCode,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: &'static [u8],
}

impl Canned {
    pub fn ok(body: &'static [u8]) -> Self {
        Self {
            status: StatusCode::OK,
            headers: Vec::new(),
            body,
        }
    }

    fn to_response(&self) -> Response<Body> {
        let mut builder = Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::from(self.body)).unwrap()
    }
}

async fn record(request: Request, recordings: &Recordings) -> Recorded {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let recorded = Recorded {
        method: parts.method,
        uri: parts.uri,
        headers: parts.headers,
        body,
    };
    recordings.lock().unwrap().push(recorded.clone());
    recorded
}

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Start an upstream that records every request and answers with `canned`.
pub async fn start_recording_backend(canned: Canned) -> (SocketAddr, Recordings) {
    let recordings = Recordings::default();
    let router = Router::new()
        .fallback(
            |State((canned, recordings)): State<(Canned, Recordings)>, request: Request| async move {
                record(request, &recordings).await;
                canned.to_response()
            },
        )
        .with_state((canned, recordings.clone()));

    (serve(router).await, recordings)
}

/// Start an upstream that echoes the request body and content type back.
pub async fn start_echo_backend() -> SocketAddr {
    let router = Router::new().fallback(|request: Request| async move {
        let content_type = request.headers().get("content-type").cloned();
        let body = axum::body::to_bytes(request.into_body(), usize::MAX).await.unwrap();
        let mut response = Response::new(Body::from(body));
        if let Some(content_type) = content_type {
            response.headers_mut().insert("content-type", content_type);
        }
        response
    });

    serve(router).await
}

/// Start a raw upstream that reads the request head and answers every
/// connection with `response` verbatim, then hangs up.
pub async fn start_raw_backend(response: String) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let response = response.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Start a raw upstream that answers every connection with a chunked body.
pub async fn start_chunked_backend(chunks: &[&str]) -> SocketAddr {
    let mut response = String::from(
        "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nContent-Type: text/plain\r\nConnection: close\r\n\r\n",
    );
    for chunk in chunks {
        response.push_str(&format!("{:x}\r\n{}\r\n", chunk.len(), chunk));
    }
    response.push_str("0\r\n\r\n");

    start_raw_backend(response).await
}

/// What a [`start_hanging_backend`] upstream observed on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// A request arrived; no answer will be sent.
    RequestReceived,
    /// The peer closed the connection.
    Closed,
}

/// Start an upstream that reads requests, never answers, and reports when
/// the peer hangs up.
pub async fn start_hanging_backend() -> (SocketAddr, mpsc::UnboundedReceiver<ConnectionEvent>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let events = events_tx.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let mut announced = false;
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) if !announced => {
                            announced = true;
                            let _ = events.send(ConnectionEvent::RequestReceived);
                        }
                        Ok(_) => {}
                    }
                }
                let _ = events.send(ConnectionEvent::Closed);
            });
        }
    });

    (addr, events_rx)
}

/// Start an upstream that accepts connections and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// One mount at [`MOUNT`] forwarding to `upstream_addr`, with a
/// "Hello World!" fallback.
pub fn config_for(upstream_addr: SocketAddr) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstreams.push(UpstreamConfig {
        name: UPSTREAM.into(),
        base_address: format!("http://{upstream_addr}/"),
        timeout_secs: 45,
        ..UpstreamConfig::default()
    });
    config.mounts.push(MountConfig {
        path: MOUNT.into(),
        upstream: UPSTREAM.into(),
    });
    config.fallback = FallbackConfig {
        status: 200,
        content_type: "text/plain".into(),
        body: "Hello World!".into(),
    };
    config
}

/// Run the proxy on an ephemeral port.
pub async fn start_proxy(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Client that never reuses connections, so each test sees fresh ones.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// In-process transport that records requests and answers with `canned`.
#[derive(Clone)]
pub struct StubTransport {
    pub canned: Canned,
    pub recordings: Recordings,
}

impl StubTransport {
    pub fn new(canned: Canned) -> Self {
        Self {
            canned,
            recordings: Recordings::default(),
        }
    }
}

impl Transport for StubTransport {
    fn send(&self, request: axum::http::Request<Body>) -> BoxFuture<'static, Result<Response<Body>, TransportError>> {
        let stub = self.clone();
        async move {
            record(request, &stub.recordings).await;
            Ok(stub.canned.to_response())
        }
        .boxed()
    }
}
