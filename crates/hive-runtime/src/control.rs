//! Control channel between the broker and one worker.
//!
//! The broker drives a worker through exactly one logical message stream
//! for the lifetime of the worker process:
//!
//! ```text
//! broker ──raw Value──────────────► Dispatcher
//! broker ◄─ControlMessage────────── Dispatcher
//! ```
//!
//! Inbound messages are raw [`Value`]s, not typed operations: a real
//! broker writes to an inter-process pipe and can send anything, so the
//! dispatcher must decode on its side and answer garbage with a
//! diagnostic instead of failing to deserialize in the transport. The
//! outbound direction is typed because the dispatcher only ever emits
//! well-formed responses.
//!
//! [`ControlHandle`] is the broker-facing half; the dispatcher holds the
//! other two channel ends directly. Dropping the handle closes the
//! channel and the dispatcher's run loop ends.

use hive_proto::Operation;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::WorkerError;

/// One message from the worker back to the broker.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlMessage {
    /// A well-formed response operation.
    Operation(Operation),
    /// Best-effort notice about input that never became an operation.
    ///
    /// Sent when an inbound value is malformed (not an object, missing
    /// or unknown `type`, undecodable payload). Carries no state change.
    Diagnostic(String),
}

/// Broker-side handle to one worker's control channel.
///
/// # Example
///
/// ```no_run
/// # use hive_app::testing::EchoApp;
/// # use hive_proto::{AppConfig, Operation};
/// # use hive_runtime::{Dispatcher, PeerDirectory};
/// # use std::sync::Arc;
/// # async fn demo() {
/// let (dispatcher, mut handle) = Dispatcher::with_blueprint(
///     EchoApp::blueprint("echoes"),
///     AppConfig::without_network(),
///     Arc::new(PeerDirectory::new()),
/// );
/// tokio::spawn(dispatcher.run());
///
/// handle.send(Operation::AppCreate).await.unwrap();
/// let created = handle.recv().await.unwrap();
/// # let _ = created;
/// # }
/// ```
#[derive(Debug)]
pub struct ControlHandle {
    op_tx: mpsc::Sender<Value>,
    msg_rx: mpsc::Receiver<ControlMessage>,
}

impl ControlHandle {
    pub(crate) fn new(op_tx: mpsc::Sender<Value>, msg_rx: mpsc::Receiver<ControlMessage>) -> Self {
        Self { op_tx, msg_rx }
    }

    /// Sends a typed operation to the worker.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::SendFailed`] if the operation cannot be
    /// encoded or the worker side of the channel is gone.
    pub async fn send(&self, op: Operation) -> Result<(), WorkerError> {
        let raw = op
            .encode()
            .map_err(|err| WorkerError::SendFailed(err.to_string()))?;
        self.send_raw(raw).await
    }

    /// Sends a raw value to the worker, bypassing the typed encoder.
    ///
    /// This is the same path a real broker pipe takes; it exists so the
    /// malformed-operation handling is reachable in-process.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::SendFailed`] if the worker side of the
    /// channel is gone.
    pub async fn send_raw(&self, raw: Value) -> Result<(), WorkerError> {
        self.op_tx
            .send(raw)
            .await
            .map_err(|_| WorkerError::SendFailed("control channel closed".into()))
    }

    /// Receives the next message from the worker.
    ///
    /// Returns `None` once the dispatcher has stopped.
    pub async fn recv(&mut self) -> Option<ControlMessage> {
        self.msg_rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn send_delivers_encoded_operation() {
        let (op_tx, mut op_rx) = mpsc::channel(4);
        let (_msg_tx, msg_rx) = mpsc::channel(4);
        let handle = ControlHandle::new(op_tx, msg_rx);

        handle.send(Operation::AppPing).await.unwrap();

        let raw = op_rx.recv().await.unwrap();
        assert_eq!(raw, json!({"type": "APP_PING"}));
    }

    #[tokio::test]
    async fn send_raw_passes_garbage_through() {
        let (op_tx, mut op_rx) = mpsc::channel(4);
        let (_msg_tx, msg_rx) = mpsc::channel(4);
        let handle = ControlHandle::new(op_tx, msg_rx);

        handle.send_raw(json!(["not", "an", "object"])).await.unwrap();

        let raw = op_rx.recv().await.unwrap();
        assert!(raw.is_array());
    }

    #[tokio::test]
    async fn send_to_dead_worker_fails() {
        let (op_tx, op_rx) = mpsc::channel(4);
        let (_msg_tx, msg_rx) = mpsc::channel(4);
        drop(op_rx);
        let handle = ControlHandle::new(op_tx, msg_rx);

        let err = handle.send(Operation::AppPing).await.unwrap_err();
        assert!(matches!(err, WorkerError::SendFailed(_)));
    }

    #[tokio::test]
    async fn recv_sees_worker_messages_in_order() {
        let (op_tx, _op_rx) = mpsc::channel(4);
        let (msg_tx, msg_rx) = mpsc::channel(4);
        let mut handle = ControlHandle::new(op_tx, msg_rx);

        msg_tx
            .send(ControlMessage::Diagnostic("first".into()))
            .await
            .unwrap();
        msg_tx
            .send(ControlMessage::Operation(Operation::AppPing))
            .await
            .unwrap();

        assert_eq!(
            handle.recv().await,
            Some(ControlMessage::Diagnostic("first".into()))
        );
        assert_eq!(
            handle.recv().await,
            Some(ControlMessage::Operation(Operation::AppPing))
        );

        drop(msg_tx);
        assert_eq!(handle.recv().await, None);
    }
}
