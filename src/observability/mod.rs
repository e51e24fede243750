//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarded calls produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (request counter and latency histogram)
//!
//! Consumers:
//!     → stdout (fmt layer, filtered by RUST_LOG or config)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Log level configurable via config and environment; environment wins
//! - Metrics are recorded even when no exporter is installed (no-op recorder)

pub mod logging;
pub mod metrics;
