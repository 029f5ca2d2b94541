//! The transport seam and its HTTP implementation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::trace;

use super::error::ChainError;
use super::types::{RpcMethod, RpcRequest, RpcResponse};

/// One JSON-RPC endpoint.
///
/// Implementations enforce `timeout` themselves and map every failure to a
/// [`ChainError`]. A JSON `null` result comes back as `Value::Null`; what
/// that means is the caller's business.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// The URL (or label) this transport talks to.
    fn endpoint(&self) -> &str;

    /// Performs a single call.
    async fn request(
        &self,
        method: RpcMethod,
        params: Value,
        timeout: Duration,
    ) -> Result<Value, ChainError>;
}

#[async_trait]
impl<T: RpcTransport + ?Sized> RpcTransport for Arc<T> {
    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }

    async fn request(
        &self,
        method: RpcMethod,
        params: Value,
        timeout: Duration,
    ) -> Result<Value, ChainError> {
        (**self).request(method, params, timeout).await
    }
}

/// JSON-RPC over HTTP(S) with a keep-alive connection pool.
///
/// One instance per endpoint; the inner `reqwest::Client` reuses
/// connections across calls, so building a new transport per request
/// throws away the TLS handshake every time. Use [`super::ClientPool`].
#[derive(Debug)]
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(endpoint: &str, connect_timeout: Duration) -> Result<Self, ChainError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    async fn round_trip(&self, body: &RpcRequest) -> Result<RpcResponse, ChainError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        // Some providers return JSON-RPC errors with a 4xx/5xx status; prefer
        // the structured error when the body parses.
        match serde_json::from_slice::<RpcResponse>(&bytes) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => {
                Err(ChainError::Transport(format!("HTTP {status}")))
            }
            Err(e) => Err(ChainError::Decode(e.to_string())),
        }
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(
        &self,
        method: RpcMethod,
        params: Value,
        timeout: Duration,
    ) -> Result<Value, ChainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest::new(json!(id), method, params);
        trace!(endpoint = %self.endpoint, %method, id, "rpc request");

        let response = tokio::time::timeout(timeout, self.round_trip(&body))
            .await
            .map_err(|_| ChainError::Timeout {
                method: method.to_string(),
                after_ms: timeout.as_millis() as u64,
            })??;

        if let Some(err) = response.error {
            return Err(err.into());
        }
        Ok(response.result.unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_without_network() {
        let t = HttpTransport::new("https://rpc.invalid", Duration::from_secs(1)).unwrap();
        assert_eq!(t.endpoint(), "https://rpc.invalid");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        // Port 9 on localhost: nothing listens there in CI.
        let t = HttpTransport::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let err = t
            .request(RpcMethod::ChainId, json!([]), Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(
            matches!(err, ChainError::Transport(_) | ChainError::Timeout { .. }),
            "unexpected error: {err:?}"
        );
    }
}
