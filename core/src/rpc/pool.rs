//! One [`ChainClient`] per endpoint URL, created lazily and shared.
//!
//! Creation happens under the `DashMap` shard lock for that URL, so two
//! tasks racing on a cold endpoint still produce exactly one client.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use super::client::ChainClient;
use super::error::ChainError;
use super::transport::{HttpTransport, RpcTransport};
use crate::config::EngineConfig;

type Connector<T> = Arc<dyn Fn(&str) -> Result<T, ChainError> + Send + Sync>;

/// Registry of shared chain clients keyed by endpoint URL.
pub struct ClientPool<T> {
    clients: DashMap<String, Arc<ChainClient<T>>>,
    connector: Connector<T>,
    config: EngineConfig,
}

impl<T> fmt::Debug for ClientPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientPool")
            .field("endpoints", &self.clients.len())
            .field("config", &self.config)
            .finish()
    }
}

impl ClientPool<HttpTransport> {
    /// Pool of HTTP clients using the config's connect timeout.
    pub fn http(config: EngineConfig) -> Self {
        let connect_timeout = config.connect_timeout;
        Self::with_connector(config, move |endpoint| {
            HttpTransport::new(endpoint, connect_timeout)
        })
    }
}

impl<T: RpcTransport> ClientPool<T> {
    /// Pool over a custom transport factory.
    pub fn with_connector<F>(config: EngineConfig, connector: F) -> Self
    where
        F: Fn(&str) -> Result<T, ChainError> + Send + Sync + 'static,
    {
        Self {
            clients: DashMap::new(),
            connector: Arc::new(connector),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Client for `endpoint`, connecting on first use.
    pub fn client(&self, endpoint: &str) -> Result<Arc<ChainClient<T>>, ChainError> {
        if let Some(existing) = self.clients.get(endpoint) {
            return Ok(Arc::clone(existing.value()));
        }

        let entry = self
            .clients
            .entry(endpoint.to_string())
            .or_try_insert_with(|| {
                tracing::debug!(endpoint, "opening rpc client");
                let transport = (self.connector)(endpoint)?;
                Ok::<_, ChainError>(Arc::new(ChainClient::new(transport, &self.config)))
            })?;
        Ok(Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
