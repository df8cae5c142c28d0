//! Peer routing and the TCP transport behind the RPC client.
//!
//! A topic like `"planner.isAlive"` is addressed in two steps: the first
//! dot-separated segment names the peer application, the remainder is
//! the method identifier passed through opaquely (so deeper component
//! paths such as `"planner.todo.add"` keep working). [`PeerDirectory`]
//! resolves the peer name to a socket address; [`MeshTransport`] dials
//! it, sends one `Call` frame and waits for the matching `CallResult`.
//!
//! The directory is filled by whoever embeds the runtime: the broker in
//! production, the test harness in tests. A worker that binds its
//! gateway also registers its own name so co-located workers can greet
//! it.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hive_app::{RpcError, RpcTransport};
use hive_proto::{Call, Frame};
use hive_types::CallId;
use parking_lot::RwLock;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// Name → socket-address map for the peers this worker can call.
///
/// # Example
///
/// ```
/// use hive_runtime::PeerDirectory;
///
/// let directory = PeerDirectory::new();
/// directory.register("planner", "127.0.0.1:7410".parse().unwrap());
/// assert!(directory.resolve("planner").is_some());
///
/// directory.deregister("planner");
/// assert!(directory.resolve("planner").is_none());
/// ```
#[derive(Debug, Default)]
pub struct PeerDirectory {
    peers: RwLock<HashMap<String, SocketAddr>>,
}

impl PeerDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or re-registers) a peer's address.
    pub fn register(&self, name: impl Into<String>, addr: SocketAddr) {
        let name = name.into();
        debug!(peer = %name, %addr, "peer registered");
        self.peers.write().insert(name, addr);
    }

    /// Removes a peer. Unknown names are a no-op.
    pub fn deregister(&self, name: &str) {
        if self.peers.write().remove(name).is_some() {
            debug!(peer = %name, "peer deregistered");
        }
    }

    /// Resolves a peer name to its registered address.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<SocketAddr> {
        self.peers.read().get(name).copied()
    }
}

/// [`RpcTransport`] that dials the peer's gateway per call.
///
/// One call is one short-lived connection: dial, write the `Call`
/// frame, read frames until the matching `CallResult` arrives. The
/// whole exchange is bounded by the caller's timeout.
#[derive(Debug)]
pub struct MeshTransport {
    directory: Arc<PeerDirectory>,
}

impl MeshTransport {
    /// Creates a transport resolving peers through `directory`.
    #[must_use]
    pub fn new(directory: Arc<PeerDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl RpcTransport for MeshTransport {
    async fn call(&self, topic: &str, args: Value, timeout_ms: u64) -> Result<Value, RpcError> {
        let (peer, method) = split_topic(topic)?;
        let addr = self
            .directory
            .resolve(peer)
            .ok_or_else(|| RpcError::UnknownPeer(peer.to_string()))?;
        debug!(%topic, %addr, timeout_ms, "dialing peer");

        match tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            exchange(addr, method, args),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(%topic, timeout_ms, "call timed out");
                Err(RpcError::Timeout {
                    topic: topic.to_string(),
                    timeout_ms,
                })
            }
        }
    }
}

/// Splits `"peer.method"` at the first dot.
fn split_topic(topic: &str) -> Result<(&str, &str), RpcError> {
    match topic.split_once('.') {
        Some((peer, method)) if !peer.is_empty() && !method.is_empty() => Ok((peer, method)),
        _ => Err(RpcError::Transport(format!(
            "topic {topic:?} must be \"<peer>.<method>\""
        ))),
    }
}

/// Dials `addr` and runs one call to completion.
async fn exchange(addr: SocketAddr, method: &str, args: Value) -> Result<Value, RpcError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|err| RpcError::Transport(err.to_string()))?;
    let (read_half, mut write_half) = stream.into_split();

    let id = CallId::new();
    let frame = Frame::Call {
        id,
        call: Call::new(method, args),
    };
    let mut line = frame
        .to_line()
        .map_err(|err| RpcError::Transport(err.to_string()))?;
    line.push('\n');
    write_half
        .write_all(line.as_bytes())
        .await
        .map_err(|err| RpcError::Transport(err.to_string()))?;

    let mut lines = BufReader::new(read_half).lines();
    loop {
        let line = lines
            .next_line()
            .await
            .map_err(|err| RpcError::Transport(err.to_string()))?
            .ok_or_else(|| RpcError::Transport("connection closed before reply".into()))?;
        let frame = Frame::from_line(&line)
            .map_err(|err| RpcError::Transport(err.to_string()))?;
        match frame {
            Frame::CallResult {
                id: reply_id,
                outcome,
            } if reply_id == id => return outcome.map_err(RpcError::Remote),
            other => {
                debug!(frame = other.name(), "ignoring unrelated frame");
            }
        }
    }
}
