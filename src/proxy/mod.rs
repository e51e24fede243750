//! Forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (mount prefix already stripped)
//!     → redirector.rs (sequence one call)
//!     → http::request (translate inbound → outbound)
//!     → transport.rs (resolve against base, send, timeout)
//!     → http::response (translate upstream → caller)
//! ```
//!
//! # Design Decisions
//! - Upstream names are resolved to transports once, at mount time
//! - No shared mutable state: redirectors are cloned freely across tasks
//! - The transport is a trait so tests can stand in for the network

pub mod redirector;
pub mod registry;
pub mod transport;

pub use redirector::Redirector;
pub use registry::UpstreamRegistry;
pub use transport::{HttpTransport, Transport};
