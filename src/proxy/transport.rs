//! Upstream transport.
//!
//! # Responsibilities
//! - Send one fully-formed request, return one response or a transport error
//! - Resolve relative targets against the upstream base address
//! - Enforce the upstream's connect and request timeouts
//!
//! # Design Decisions
//! - Pooling, DNS and keep-alive belong to the hyper-util client
//! - No retries: a failed send is reported once
//! - Dropping the returned future cancels the exchange and releases the
//!   connection together with both body streams

use std::error::Error as StdError;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, Uri};
use futures_util::future::{BoxFuture, FutureExt};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::UpstreamConfig;
use crate::error::{RegistryError, TransportError};

/// Capability to exchange a request with an upstream.
pub trait Transport: Send + Sync {
    /// Sends `request` and resolves to the upstream's response head.
    ///
    /// The response body is still streaming when the future resolves.
    fn send(&self, request: Request<Body>) -> BoxFuture<'static, Result<Response<Body>, TransportError>>;
}

/// Pooled HTTP/1.1 transport bound to one named upstream.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    name: String,
    base: Uri,
    timeout: Duration,
    client: Client<HttpConnector, Body>,
}

impl HttpTransport {
    /// Build a transport from an upstream definition.
    pub fn new(config: &UpstreamConfig) -> Result<Self, RegistryError> {
        let base: Uri = config
            .base_address
            .parse()
            .map_err(|source| RegistryError::InvalidBaseAddress {
                name: config.name.clone(),
                source,
            })?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build(connector);

        Ok(Self {
            name: config.name.clone(),
            base,
            timeout: Duration::from_secs(config.timeout_secs),
            client,
        })
    }

    /// The logical upstream name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve a relative target against the base address.
    ///
    /// The base path, if any, prefixes the target path.
    pub fn resolve(&self, target: &Uri) -> Result<Uri, TransportError> {
        let base_path = self.base.path().trim_end_matches('/');
        let path_and_query = match target.query() {
            Some(query) => format!("{base_path}{}?{query}", target.path()),
            None => format!("{base_path}{}", target.path()),
        };

        let mut parts = self.base.clone().into_parts();
        parts.path_and_query = Some(
            path_and_query
                .parse()
                .map_err(|e| TransportError::InvalidTarget(axum::http::Error::from(e)))?,
        );
        Uri::from_parts(parts).map_err(|e| TransportError::InvalidTarget(e.into()))
    }

    fn classify(&self, err: hyper_util::client::legacy::Error) -> TransportError {
        let upstream = self.name.clone();
        if err.is_connect() {
            TransportError::Connect {
                upstream,
                source: Box::new(err),
            }
        } else if caused_by_body(&err) {
            TransportError::BodyStream {
                upstream,
                source: Box::new(err),
            }
        } else {
            TransportError::Request {
                upstream,
                source: Box::new(err),
            }
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: Request<Body>) -> BoxFuture<'static, Result<Response<Body>, TransportError>> {
        let transport = self.clone();
        async move {
            let (mut parts, body) = request.into_parts();
            parts.uri = transport.resolve(&parts.uri)?;

            tracing::trace!(upstream = %transport.name, uri = %parts.uri, "Sending upstream request");

            let exchange = transport.client.request(Request::from_parts(parts, body));
            match tokio::time::timeout(transport.timeout, exchange).await {
                Ok(Ok(response)) => Ok(response.map(Body::new)),
                Ok(Err(err)) => Err(transport.classify(err)),
                Err(_) => Err(TransportError::Timeout {
                    upstream: transport.name.clone(),
                    timeout: transport.timeout,
                }),
            }
        }
        .boxed()
    }
}

/// Walks the cause chain looking for a failure of the outgoing body.
fn caused_by_body(err: &(dyn StdError + 'static)) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(hyper_err) = cause.downcast_ref::<hyper::Error>() {
            if hyper_err.is_user() || hyper_err.is_body_write_aborted() {
                return true;
            }
        }
        source = cause.source();
    }
    false
}
