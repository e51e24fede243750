//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, mount matching, fallback)
//!     → request.rs (inbound → outbound: method, target, headers, body)
//!     → [proxy::transport sends to the upstream]
//!     → response.rs (upstream → caller: status, headers, content type, body)
//!     → Send to client
//! ```
//!
//! `headers.rs` holds the filtering rules both translators share.

pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use request::translate_request;
pub use response::translate_response;
pub use server::HttpServer;
