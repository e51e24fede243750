//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (mounts reference existing upstreams)
//! - Validate value ranges (timeouts > 0, status codes, addresses)
//! - Reject mount paths the router cannot nest
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: ProxyConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use axum::http::{StatusCode, Uri};

use crate::config::schema::{MountConfig, ProxyConfig, UpstreamConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g., `mounts[0].path`).
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !is_bind_address(&config.listener.bind_address) {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("{:?} is not a host:port address", config.listener.bind_address),
        ));
    }

    let mut names = HashSet::new();
    for (i, upstream) in config.upstreams.iter().enumerate() {
        validate_upstream(i, upstream, &mut errors);
        if !upstream.name.is_empty() && !names.insert(upstream.name.as_str()) {
            errors.push(ValidationError::new(
                format!("upstreams[{i}].name"),
                format!("duplicate upstream name {:?}", upstream.name),
            ));
        }
    }

    let mut paths = HashSet::new();
    for (i, mount) in config.mounts.iter().enumerate() {
        validate_mount(i, mount, &mut errors);
        if !paths.insert(mount.path.as_str()) {
            errors.push(ValidationError::new(
                format!("mounts[{i}].path"),
                format!("duplicate mount path {:?}", mount.path),
            ));
        }
        if !names.contains(mount.upstream.as_str()) {
            errors.push(ValidationError::new(
                format!("mounts[{i}].upstream"),
                format!("unknown upstream {:?}", mount.upstream),
            ));
        }
    }

    if StatusCode::from_u16(config.fallback.status).is_err() {
        errors.push(ValidationError::new(
            "fallback.status",
            format!("{} is not a valid status code", config.fallback.status),
        ));
    }
    if config.fallback.content_type.parse::<mime::Mime>().is_err() {
        errors.push(ValidationError::new(
            "fallback.content_type",
            format!("{:?} is not a media type", config.fallback.content_type),
        ));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("expected one of {}", LOG_LEVELS.join(", ")),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("{:?} is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Accepts what the listener can bind: a socket address, or `host:port`
/// with a hostname resolved at bind time.
fn is_bind_address(addr: &str) -> bool {
    if addr.parse::<SocketAddr>().is_ok() {
        return true;
    }
    match addr.rsplit_once(':') {
        Some((host, port)) => {
            !host.is_empty()
                && !host.contains(|c: char| c.is_whitespace() || c == ':' || c == '/')
                && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}

fn validate_upstream(i: usize, upstream: &UpstreamConfig, errors: &mut Vec<ValidationError>) {
    if upstream.name.trim().is_empty() {
        errors.push(ValidationError::new(format!("upstreams[{i}].name"), "must not be empty"));
    }

    match upstream.base_address.parse::<Uri>() {
        Ok(uri) => {
            // Only plain HTTP: the connector does not speak TLS.
            if uri.scheme_str() != Some("http") {
                errors.push(ValidationError::new(
                    format!("upstreams[{i}].base_address"),
                    "scheme must be http",
                ));
            }
            if uri.authority().is_none() {
                errors.push(ValidationError::new(
                    format!("upstreams[{i}].base_address"),
                    "missing host",
                ));
            }
            if uri.query().is_some() {
                errors.push(ValidationError::new(
                    format!("upstreams[{i}].base_address"),
                    "must not carry a query string",
                ));
            }
        }
        Err(e) => errors.push(ValidationError::new(
            format!("upstreams[{i}].base_address"),
            format!("{:?} is not a URI: {e}", upstream.base_address),
        )),
    }

    if upstream.timeout_secs == 0 {
        errors.push(ValidationError::new(format!("upstreams[{i}].timeout_secs"), "must be > 0"));
    }
    if upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::new(
            format!("upstreams[{i}].connect_timeout_secs"),
            "must be > 0",
        ));
    }
}

fn validate_mount(i: usize, mount: &MountConfig, errors: &mut Vec<ValidationError>) {
    let field = format!("mounts[{i}].path");
    let path = mount.path.as_str();

    if !path.starts_with('/') {
        errors.push(ValidationError::new(field, "must start with '/'"));
    } else if path == "/" {
        errors.push(ValidationError::new(field, "cannot mount at the root"));
    } else if path.ends_with('/') {
        errors.push(ValidationError::new(field, "must not end with '/'"));
    } else if path.contains(['{', '}', '*']) {
        errors.push(ValidationError::new(field, "must not contain captures or wildcards"));
    }
}
