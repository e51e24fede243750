//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router: one nested redirector per mount
//! - Answer everything else with the configured fallback
//! - Map forwarding failures to caller-facing status codes
//! - Serve with graceful shutdown

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::{FallbackConfig, ProxyConfig};
use crate::error::{ForwardError, RegistryError};
use crate::lifecycle::shutdown::signalled;
use crate::proxy::{Redirector, UpstreamRegistry};

/// HTTP server for the redirector.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server whose upstreams are built from the configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, RegistryError> {
        let registry = UpstreamRegistry::from_config(&config.upstreams)?;
        Self::with_registry(config, &registry)
    }

    /// Create a server resolving upstream names against `registry`.
    pub fn with_registry(config: ProxyConfig, registry: &UpstreamRegistry) -> Result<Self, RegistryError> {
        let router = Self::build_router(&config, registry)?;
        Ok(Self { router, config })
    }

    /// Build the Axum router with all mounts and middleware layers.
    fn build_router(config: &ProxyConfig, registry: &UpstreamRegistry) -> Result<Router, RegistryError> {
        let mut router = Router::new();

        for mount in &config.mounts {
            let redirector = Redirector::from_registry(registry, &mount.upstream)?;
            tracing::info!(path = %mount.path, upstream = %mount.upstream, "Mounted redirector");

            let forwarding = Router::new().fallback(forward).with_state(redirector);
            router = router.nest_service(&mount.path, forwarding);
        }

        Ok(router
            .fallback(fallback)
            .with_state(config.fallback.clone())
            .layer(TraceLayer::new_for_http()))
    }

    /// A clone of the router, for serving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, mounts = self.config.mounts.len(), "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(signalled(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Forward everything under a mount.
async fn forward(State(redirector): State<Redirector>, request: Request) -> Result<Response<Body>, ForwardError> {
    redirector.forward(request).await
}

/// Terminal responder for unmatched paths.
async fn fallback(State(fallback): State<FallbackConfig>) -> Response {
    let status = StatusCode::from_u16(fallback.status).unwrap_or(StatusCode::NOT_FOUND);
    let mut response = (status, fallback.body).into_response();
    if let Ok(content_type) = HeaderValue::from_str(&fallback.content_type) {
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    response
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match status {
            StatusCode::BAD_REQUEST => self.to_string(),
            StatusCode::GATEWAY_TIMEOUT => "Upstream timed out".to_string(),
            _ => "Upstream request failed".to_string(),
        };
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MountConfig, UpstreamConfig};
    use tower::ServiceExt;

    fn config() -> ProxyConfig {
        let mut config = ProxyConfig::default();
        config.upstreams.push(UpstreamConfig {
            name: "Redirector".into(),
            base_address: "http://127.0.0.1:9/".into(),
            ..UpstreamConfig::default()
        });
        config.mounts.push(MountConfig {
            path: "/api/redirector".into(),
            upstream: "Redirector".into(),
        });
        config.fallback = FallbackConfig {
            status: 200,
            content_type: "text/plain".into(),
            body: "Hello World!".into(),
        };
        config
    }

    #[tokio::test]
    async fn test_fallback_answers_unmatched_paths() {
        let server = HttpServer::new(config()).unwrap();

        let response = server
            .router()
            .oneshot(Request::builder().uri("/api/other").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Hello World!");
    }

    #[test]
    fn test_unknown_mount_upstream() {
        let mut config = config();
        config.mounts[0].upstream = "Missing".into();

        let err = HttpServer::new(config).err().unwrap();
        assert!(matches!(err, RegistryError::UnknownUpstream(name) if name == "Missing"));
    }

    #[test]
    fn test_error_bodies() {
        let response = ForwardError::MalformedContentType("x".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ForwardError::MalformedUpstreamContentType("x".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
