//! HTTP request redirector library.
//!
//! Forwards every request under a mount path to a named upstream and relays
//! the upstream's answer, keeping method, target, headers, content type,
//! status and body intact apart from framing-header hygiene.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;

pub use config::schema::ProxyConfig;
pub use error::{ForwardError, TransportError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::{Redirector, Transport, UpstreamRegistry};
