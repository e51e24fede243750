//! Forwarding handler.
//!
//! Sequences one forwarded call: translate the inbound request, send it
//! through the bound transport, translate the upstream response.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};

use crate::error::{ForwardError, RegistryError};
use crate::http::request::translate_request;
use crate::http::response::translate_response;
use crate::observability::metrics;
use crate::proxy::registry::UpstreamRegistry;
use crate::proxy::transport::Transport;

/// Forwards requests to one named upstream.
///
/// Holds nothing but the upstream binding, so a single instance serves any
/// number of concurrent calls.
#[derive(Clone)]
pub struct Redirector {
    upstream: String,
    transport: Arc<dyn Transport>,
}

impl Redirector {
    /// Bind a redirector to an explicit transport.
    pub fn new(upstream: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            upstream: upstream.into(),
            transport,
        }
    }

    /// Bind a redirector to the transport registered under `upstream`.
    pub fn from_registry(registry: &UpstreamRegistry, upstream: &str) -> Result<Self, RegistryError> {
        Ok(Self::new(upstream, registry.resolve(upstream)?))
    }

    /// The upstream this redirector forwards to.
    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    /// Forward one request and return the caller-facing response.
    pub async fn forward(&self, request: Request<Body>) -> Result<Response<Body>, ForwardError> {
        let start = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        tracing::debug!(
            upstream = %self.upstream,
            method = %method,
            path = %path,
            "Forwarding request"
        );

        let result = self.exchange(request).await;

        match &result {
            Ok(response) => {
                tracing::info!(
                    upstream = %self.upstream,
                    method = %method,
                    path = %path,
                    status = response.status().as_u16(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Request forwarded"
                );
                metrics::record_forward(&self.upstream, method.as_str(), response.status().as_u16(), start);
            }
            Err(err) if err.is_client_error() => {
                tracing::warn!(upstream = %self.upstream, method = %method, path = %path, error = %err, "Rejected request");
                metrics::record_forward(&self.upstream, method.as_str(), err.status_code().as_u16(), start);
            }
            Err(err) => {
                tracing::error!(upstream = %self.upstream, method = %method, path = %path, error = %err, "Upstream error");
                metrics::record_forward(&self.upstream, method.as_str(), err.status_code().as_u16(), start);
            }
        }

        result
    }

    async fn exchange(&self, request: Request<Body>) -> Result<Response<Body>, ForwardError> {
        let outbound = translate_request(request)?;
        let method = outbound.method().clone();
        let upstream_response = self.transport.send(outbound).await?;
        translate_response(upstream_response, &method)
    }
}

impl std::fmt::Debug for Redirector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Redirector")
            .field("upstream", &self.upstream)
            .finish_non_exhaustive()
    }
}
