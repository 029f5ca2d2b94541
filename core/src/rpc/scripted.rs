//! In-process JSON-RPC double.
//!
//! Replies are scripted per method. Each method has a queue; the last
//! entry is sticky, so scripting `eth_gasPrice` once answers every later
//! call too. Scripting a method again after its sticky reply has been
//! served replaces that reply.
//!
//! Every request is recorded so tests can assert on what was (and was
//! not) sent to the "node".

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::error::ChainError;
use super::transport::RpcTransport;
use super::types::RpcMethod;

#[derive(Debug, Clone)]
enum Reply {
    Value(Value),
    Error(ChainError),
    /// Never answers; the caller's timeout fires.
    Hang,
}

/// Reply queue for one method.
#[derive(Debug, Default)]
struct Script {
    queue: VecDeque<Reply>,
    /// The lone remaining reply has been answered at least once.
    sticky_served: bool,
}

/// A request the scripted node received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: RpcMethod,
    pub params: Value,
}

/// Scripted [`RpcTransport`].
#[derive(Debug)]
pub struct ScriptedTransport {
    endpoint: String,
    replies: Mutex<HashMap<RpcMethod, Script>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new("scripted://node")
    }
}

impl ScriptedTransport {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn push(&self, method: RpcMethod, reply: Reply) -> &Self {
        let mut replies = self.replies.lock();
        let script = replies.entry(method).or_default();
        if script.sticky_served {
            script.queue.clear();
            script.sticky_served = false;
        }
        script.queue.push_back(reply);
        self
    }

    /// Queues a successful result.
    pub fn reply(&self, method: RpcMethod, result: Value) -> &Self {
        self.push(method, Reply::Value(result))
    }

    /// Queues a failure.
    pub fn fail(&self, method: RpcMethod, error: ChainError) -> &Self {
        self.push(method, Reply::Error(error))
    }

    /// Queues a reply that never arrives.
    pub fn hang(&self, method: RpcMethod) -> &Self {
        self.push(method, Reply::Hang)
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of calls received for `method`.
    pub fn count(&self, method: RpcMethod) -> usize {
        self.calls.lock().iter().filter(|c| c.method == method).count()
    }

    /// Hex payloads passed to `eth_sendRawTransaction`.
    pub fn broadcasts(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.method == RpcMethod::SendRawTransaction)
            .filter_map(|c| c.params.get(0).and_then(Value::as_str).map(str::to_string))
            .collect()
    }

    fn next_reply(&self, method: RpcMethod) -> Option<Reply> {
        let mut replies = self.replies.lock();
        let script = replies.get_mut(&method)?;
        if script.queue.len() > 1 {
            script.queue.pop_front()
        } else {
            script.sticky_served = true;
            script.queue.front().cloned()
        }
    }
}

#[async_trait]
impl RpcTransport for ScriptedTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(
        &self,
        method: RpcMethod,
        params: Value,
        timeout: Duration,
    ) -> Result<Value, ChainError> {
        self.calls.lock().push(RecordedCall { method, params });

        match self.next_reply(method) {
            Some(Reply::Value(v)) => Ok(v),
            Some(Reply::Error(e)) => Err(e),
            Some(Reply::Hang) => {
                tokio::time::sleep(timeout).await;
                Err(ChainError::Timeout {
                    method: method.to_string(),
                    after_ms: timeout.as_millis() as u64,
                })
            }
            None => Err(ChainError::Transport(format!(
                "no scripted reply for {method}"
            ))),
        }
    }
}
