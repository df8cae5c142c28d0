//! Application trait for hive worker processes.
//!
//! An application is the long-lived business object of one worker
//! process: constructed once when the broker sends `APP_CREATE`,
//! started and stopped by the lifecycle operations, destroyed only when
//! the process exits. Everything the worker runtime needs from it goes
//! through this trait.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                     Worker process                         │
//! │                                                            │
//! │   broker ──control channel──► dispatcher                   │
//! │                                   │                        │
//! │                           ┌───────┴────────┐               │
//! │                           ▼                ▼               │
//! │                     Application      network gateway       │
//! │                     (this trait)                           │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Lifecycle Contract
//!
//! | Method | Called when | Must |
//! |--------|-------------|------|
//! | `start` | `APP_START` transition | finish before the worker reports started |
//! | `stop` | `APP_STOP` transition | finish before the worker reports stopped |
//! | `is_alive` | a peer greets this worker | answer without blocking |
//! | `procedures` | construction, once | register every callable method |
//!
//! `start` and `stop` are `&self`: the instance is shared (the call
//! responser holds it while a lifecycle transition runs), so mutable
//! state lives behind interior mutability.
//!
//! # Example
//!
//! ```
//! use async_trait::async_trait;
//! use hive_app::{AppError, Application, ProcedureRegistry};
//! use serde_json::Value;
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! #[derive(Debug, Default)]
//! struct TodoApp {
//!     running: AtomicBool,
//! }
//!
//! #[async_trait]
//! impl Application for TodoApp {
//!     async fn start(&self) -> Result<(), AppError> {
//!         self.running.store(true, Ordering::SeqCst);
//!         Ok(())
//!     }
//!
//!     async fn stop(&self) -> Result<(), AppError> {
//!         self.running.store(false, Ordering::SeqCst);
//!         Ok(())
//!     }
//!
//!     fn is_alive(&self) -> bool {
//!         self.running.load(Ordering::SeqCst)
//!     }
//!
//!     fn procedures(&self, registry: &mut ProcedureRegistry) {
//!         registry.register("addTodo", |args: Value| async move { Ok(args) });
//!     }
//! }
//! ```

use crate::{AppError, ProcedureRegistry, Publisher, RpcClient};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// The business object of one worker process.
///
/// Implementations must be `Send + Sync`; the runtime shares one
/// instance between the lifecycle path and concurrent call handling.
#[async_trait]
pub trait Application: Send + Sync + Debug {
    /// Brings the application up.
    ///
    /// Runs concurrently with the worker's network listener setup; the
    /// worker reports started only after both finish.
    ///
    /// # Errors
    ///
    /// Return `Err` to refuse the transition. The worker stays created
    /// and may be asked to start again.
    async fn start(&self) -> Result<(), AppError>;

    /// Brings the application down.
    ///
    /// Called after the worker's listener has closed, so no new calls
    /// arrive while this runs.
    ///
    /// # Errors
    ///
    /// Return `Err` to report an unclean stop. The failure is surfaced
    /// to the broker; the worker still considers the stop transition
    /// taken.
    async fn stop(&self) -> Result<(), AppError>;

    /// Liveness probe answered to greeting peers.
    ///
    /// Must not block: greet fan-out calls this on every probe.
    ///
    /// # Default
    ///
    /// `true` - a constructed application counts as alive unless it
    /// tracks finer state.
    fn is_alive(&self) -> bool {
        true
    }

    /// Registers the application's remote procedures.
    ///
    /// Called once during construction, before any call can arrive.
    /// Handlers capture whatever shared state they need; the registry is
    /// frozen once this returns.
    ///
    /// # Default
    ///
    /// Registers nothing. The worker still answers `isAlive`, which the
    /// factory seeds separately.
    fn procedures(&self, registry: &mut ProcedureRegistry) {
        let _ = registry;
    }
}

/// Capabilities injected into an application at construction time.
///
/// Carries the RPC client for calling peer applications and the
/// publisher for pushing stream values. Cheap to clone; clones share
/// the underlying seams.
///
/// # Example
///
/// ```
/// use hive_app::testing::test_context;
/// use serde_json::json;
///
/// let (ctx, _rpc, streams) = test_context();
/// ctx.publish("todos", &json!({"text": "read"}));
/// assert_eq!(streams.events().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct AppContext {
    rpc: RpcClient,
    streams: Arc<dyn Publisher>,
}

impl AppContext {
    /// Creates a context from its two seams.
    #[must_use]
    pub fn new(rpc: RpcClient, streams: Arc<dyn Publisher>) -> Self {
        Self { rpc, streams }
    }

    /// Returns the RPC client for calling peer applications.
    #[must_use]
    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// Returns the stream publisher.
    #[must_use]
    pub fn streams(&self) -> &Arc<dyn Publisher> {
        &self.streams
    }

    /// Publishes `value` on `topic`; returns the delivered count.
    ///
    /// Convenience for `self.streams().publish(...)`.
    pub fn publish(&self, topic: &str, value: &Value) -> usize {
        self.streams.publish(topic, value)
    }
}
