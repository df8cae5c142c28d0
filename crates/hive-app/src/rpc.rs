//! RPC client for calling procedures on peer applications.
//!
//! Applications address each other by **topic**: a dotted string whose
//! first segment names the peer application and whose remainder names
//! the procedure on that peer. `"planner.isAlive"` calls `isAlive` on
//! the application named `planner`; deeper paths such as
//! `"planner.TodoService.addTodo"` pass through opaquely (the peer's
//! registry sees `"TodoService.addTodo"`).
//!
//! The client itself never touches the network. It hands every call to
//! an [`RpcTransport`], the seam between the SDK and whatever carries
//! the call:
//!
//! | Implementation | Where | Carries calls via |
//! |----------------|-------|-------------------|
//! | mesh transport | runtime crate | TCP to the peer's gateway |
//! | `StaticRpc` | [`testing`](crate::testing) | canned in-memory outcomes |
//!
//! # Example
//!
//! ```
//! use hive_app::testing::StaticRpc;
//! use hive_app::RpcClient;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let transport = Arc::new(StaticRpc::new());
//! transport.respond("planner.isAlive", json!(true));
//!
//! let rpc = RpcClient::new(transport);
//! let alive = rpc.topic("planner.isAlive").call(json!([])).await;
//! assert_eq!(alive.unwrap(), json!(true));
//! # }
//! ```

use crate::RpcError;
use async_trait::async_trait;
use hive_proto::DEFAULT_CALL_TIMEOUT_MS;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// Transport seam the RPC client delegates to.
///
/// Implementations resolve the topic's peer segment, deliver the call,
/// and await the peer's answer. A peer that answered with a structured
/// failure must surface as [`RpcError::Remote`]; errors of delivery
/// itself use the other [`RpcError`] variants.
///
/// # Timeout Contract
///
/// `timeout_ms` is the caller's whole-call budget. Implementations must
/// bound the call by it and return [`RpcError::Timeout`] on expiry; a
/// transport that cannot time out would let a greet against a hung peer
/// stall forever.
#[async_trait]
pub trait RpcTransport: Send + Sync + Debug {
    /// Calls `topic` with `args`, bounded by `timeout_ms`.
    async fn call(&self, topic: &str, args: Value, timeout_ms: u64) -> Result<Value, RpcError>;
}

/// Handle for issuing calls to peer applications.
///
/// Cheap to clone; clones share the transport.
#[derive(Debug, Clone)]
pub struct RpcClient {
    transport: Arc<dyn RpcTransport>,
}

impl RpcClient {
    /// Creates a client over the given transport.
    #[must_use]
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self { transport }
    }

    /// Returns a callable handle for one topic.
    ///
    /// The handle starts with the default call timeout
    /// ([`DEFAULT_CALL_TIMEOUT_MS`]); override per call site with
    /// [`RpcTopic::with_timeout`].
    #[must_use]
    pub fn topic(&self, topic: impl Into<String>) -> RpcTopic {
        RpcTopic {
            transport: Arc::clone(&self.transport),
            topic: topic.into(),
            timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
        }
    }
}

/// One topic bound to a transport and a timeout.
///
/// # Example
///
/// ```
/// use hive_app::testing::StaticRpc;
/// use hive_app::RpcClient;
/// use std::sync::Arc;
///
/// let rpc = RpcClient::new(Arc::new(StaticRpc::new()));
/// let topic = rpc.topic("planner.isAlive").with_timeout(5_000);
/// assert_eq!(topic.name(), "planner.isAlive");
/// assert_eq!(topic.timeout_ms(), 5_000);
/// ```
#[derive(Debug, Clone)]
pub struct RpcTopic {
    transport: Arc<dyn RpcTransport>,
    topic: String,
    timeout_ms: u64,
}

impl RpcTopic {
    /// Overrides the call timeout, in milliseconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Returns the topic string this handle addresses.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.topic
    }

    /// Returns the timeout this handle will apply, in milliseconds.
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Calls the topic's procedure and awaits its result.
    ///
    /// # Errors
    ///
    /// Any [`RpcError`] from the transport; see the
    /// [timeout contract](RpcTransport#timeout-contract).
    pub async fn call(&self, args: Value) -> Result<Value, RpcError> {
        self.transport.call(&self.topic, args, self.timeout_ms).await
    }
}
