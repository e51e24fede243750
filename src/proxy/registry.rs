//! Named upstream registry.
//!
//! Resolves logical upstream names to transports. Resolution happens once,
//! when a mount is built; the registry is not consulted per request.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::UpstreamConfig;
use crate::error::RegistryError;
use crate::proxy::transport::{HttpTransport, Transport};

/// Registry of transports keyed by upstream name.
#[derive(Clone, Default)]
pub struct UpstreamRegistry {
    transports: HashMap<String, Arc<dyn Transport>>,
}

impl UpstreamRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an [`HttpTransport`] for every configured upstream.
    pub fn from_config(upstreams: &[UpstreamConfig]) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for upstream in upstreams {
            let transport = HttpTransport::new(upstream)?;
            tracing::debug!(
                upstream = %upstream.name,
                base_address = %upstream.base_address,
                timeout_secs = upstream.timeout_secs,
                "Upstream registered"
            );
            registry.register(upstream.name.clone(), Arc::new(transport));
        }
        Ok(registry)
    }

    /// Register (or replace) the transport for `name`.
    pub fn register(&mut self, name: impl Into<String>, transport: Arc<dyn Transport>) {
        self.transports.insert(name.into(), transport);
    }

    /// Look up the transport for `name`.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Transport>, RegistryError> {
        self.transports
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownUpstream(name.to_string()))
    }

    /// Registered upstream names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.transports.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for UpstreamRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamRegistry")
            .field("upstreams", &self.transports.keys().collect::<Vec<_>>())
            .finish()
    }
}
