//! Error types for the forwarding path.
//!
//! # Design Decisions
//! - Every failure ends the single forwarded call; nothing is retried here
//! - Status mapping lives with the error so logs and metrics agree with
//!   what the caller sees

use std::time::Duration;

use axum::http::StatusCode;

/// Boxed error used for transport causes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a single forwarded call.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// The caller's `Content-Type` is not a media type.
    #[error("malformed content type {0:?}")]
    MalformedContentType(String),

    /// The caller's `Content-Length` is not a decimal length.
    #[error("malformed content length {0:?}")]
    MalformedContentLength(String),

    /// The upstream's `Content-Type` is not a media type.
    #[error("upstream sent malformed content type {0:?}")]
    MalformedUpstreamContentType(String),

    /// The outbound target could not be assembled.
    #[error("invalid forwarding target: {0}")]
    InvalidTarget(#[source] axum::http::Error),

    /// The upstream could not be reached or did not answer.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ForwardError {
    /// Status code shown to the caller for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ForwardError::MalformedContentType(_)
            | ForwardError::MalformedContentLength(_)
            | ForwardError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            ForwardError::MalformedUpstreamContentType(_) => StatusCode::BAD_GATEWAY,
            ForwardError::Transport(TransportError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            ForwardError::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Returns true if the caller, not the upstream, caused the failure.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Failure reported by a [`Transport`](crate::proxy::Transport).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection establishment failed (refused, DNS, connect timeout).
    #[error("failed to connect to upstream {upstream}: {source}")]
    Connect {
        upstream: String,
        #[source]
        source: BoxError,
    },

    /// No response head arrived within the upstream's request timeout.
    #[error("upstream {upstream} did not respond within {timeout:?}")]
    Timeout { upstream: String, timeout: Duration },

    /// The inbound body stream failed while it was being sent upstream.
    #[error("request body stream failed while forwarding to {upstream}: {source}")]
    BodyStream {
        upstream: String,
        #[source]
        source: BoxError,
    },

    /// Any other failure while exchanging the request.
    #[error("request to upstream {upstream} failed: {source}")]
    Request {
        upstream: String,
        #[source]
        source: BoxError,
    },

    /// The request target could not be resolved against the upstream base.
    #[error("invalid upstream target: {0}")]
    InvalidTarget(#[source] axum::http::Error),
}

/// Failure while resolving named upstreams.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("no upstream named {0:?} is configured")]
    UnknownUpstream(String),

    #[error("upstream {name:?} has an invalid base address: {source}")]
    InvalidBaseAddress {
        name: String,
        #[source]
        source: axum::http::uri::InvalidUri,
    },
}
