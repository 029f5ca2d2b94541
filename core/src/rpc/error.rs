//! Error types for the chain client.

use thiserror::Error;

use super::types::RpcError;

/// Everything that can go wrong talking to a node.
///
/// `Clone` because the scripted transport hands out the same failure to
/// every caller, and because soft-failed reads log it after deciding what
/// to return.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Connection refused, TLS failure, HTTP error status, and friends.
    #[error("transport error: {0}")]
    Transport(String),

    /// The call did not complete inside its time budget.
    #[error("{method} timed out after {after_ms} ms")]
    Timeout { method: String, after_ms: u64 },

    /// The node answered with a JSON-RPC error object.
    #[error("node error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node answered, but not with anything we can parse.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// The node answered with neither a result nor an error where a result
    /// was required.
    #[error("{0} returned no result")]
    MissingResult(String),
}

impl ChainError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<RpcError> for ChainError {
    fn from(err: RpcError) -> Self {
        Self::Rpc {
            code: err.code,
            message: err.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_error_converts_verbatim() {
        let err: ChainError = RpcError::server_error("replacement transaction underpriced").into();
        assert_eq!(
            err.to_string(),
            "node error -32000: replacement transaction underpriced"
        );
        assert!(!err.is_timeout());
    }

    #[test]
    fn timeout_message() {
        let err = ChainError::Timeout {
            method: "eth_getBalance".into(),
            after_ms: 15_000,
        };
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "eth_getBalance timed out after 15000 ms");
    }
}
