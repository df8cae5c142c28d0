//! Testing doubles for application code.
//!
//! Everything a test needs to exercise an [`Application`] without a
//! running worker: ready-made applications, a canned RPC transport, and
//! a recording publisher.
//!
//! # Features
//!
//! - [`EchoApp`] / [`FailingApp`] - applications with known behavior
//! - [`StaticRpc`] - transport answering from a topic → outcome table
//! - [`RecordingPublisher`] - publisher that logs instead of fanning out
//! - [`test_context`] - wires the above into an [`AppContext`]
//!
//! # Example
//!
//! ```
//! use hive_app::testing::{test_context, EchoApp};
//! use hive_app::{Application, ProcedureRegistry};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let app = EchoApp::new();
//! app.start().await.unwrap();
//! assert!(app.is_alive());
//!
//! let mut registry = ProcedureRegistry::new();
//! app.procedures(&mut registry);
//!
//! let out = registry.dispatch("echo", json!(["hi"])).await;
//! assert_eq!(out.unwrap(), json!(["hi"]));
//! # }
//! ```

use crate::{
    AppBlueprint, AppContext, AppError, Application, ProcedureRegistry, Publisher, RpcClient,
    RpcError, RpcTransport,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Application that echoes its arguments back.
///
/// Registers two procedures:
///
/// | Method | Behavior |
/// |--------|----------|
/// | `echo` | returns `args` unchanged |
/// | `fail` | always returns `APP_EXECUTION_FAILED` |
///
/// Liveness is settable so greet outcomes can be scripted.
#[derive(Debug)]
pub struct EchoApp {
    started: AtomicBool,
    alive: AtomicBool,
}

impl Default for EchoApp {
    fn default() -> Self {
        Self {
            started: AtomicBool::new(false),
            alive: AtomicBool::new(true),
        }
    }
}

impl EchoApp {
    /// Creates an echo application (alive, not started).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a blueprint that builds a fresh [`EchoApp`].
    #[must_use]
    pub fn blueprint(name: impl Into<String>) -> AppBlueprint {
        AppBlueprint::new(name, |_ctx| {
            Ok(Arc::new(EchoApp::new()) as Arc<dyn Application>)
        })
    }

    /// Returns `true` after `start()` and before `stop()`.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Scripts the answer future `is_alive()` calls will give.
    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::SeqCst);
    }
}

#[async_trait]
impl Application for EchoApp {
    async fn start(&self) -> Result<(), AppError> {
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<(), AppError> {
        self.started.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn procedures(&self, registry: &mut ProcedureRegistry) {
        registry.register("echo", |args: Value| async move { Ok(args) });
        registry.register("fail", |_args: Value| async move {
            Err(AppError::ExecutionFailed("requested failure".into()))
        });
    }
}

/// Application whose lifecycle methods always fail.
///
/// For tests that need `APP_START`/`APP_STOP` transitions to be
/// refused.
#[derive(Debug, Default)]
pub struct FailingApp;

impl FailingApp {
    /// Returns a blueprint that builds a [`FailingApp`].
    #[must_use]
    pub fn blueprint(name: impl Into<String>) -> AppBlueprint {
        AppBlueprint::new(name, |_ctx| Ok(Arc::new(FailingApp) as Arc<dyn Application>))
    }
}

#[async_trait]
impl Application for FailingApp {
    async fn start(&self) -> Result<(), AppError> {
        Err(AppError::StartFailed("failing by construction".into()))
    }

    async fn stop(&self) -> Result<(), AppError> {
        Err(AppError::StopFailed("failing by construction".into()))
    }
}

/// One call as seen by [`StaticRpc`].
#[derive(Debug, Clone)]
pub struct RpcRecord {
    /// Topic the call addressed.
    pub topic: String,
    /// Arguments it carried.
    pub args: Value,
    /// Timeout budget it arrived with, in milliseconds.
    pub timeout_ms: u64,
}

/// Transport answering from a canned topic → outcome table.
///
/// Topics without an entry answer [`RpcError::UnknownPeer`], matching
/// what a real mesh does for an unregistered name. Every call is
/// recorded, so tests can assert on topics, arguments, and the timeout
/// the client applied.
///
/// # Example
///
/// ```
/// use hive_app::testing::StaticRpc;
/// use hive_app::RpcClient;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let transport = Arc::new(StaticRpc::new());
/// transport.respond("planner.isAlive", json!(true));
///
/// let rpc = RpcClient::new(transport.clone());
/// rpc.topic("planner.isAlive").call(json!([])).await.unwrap();
///
/// assert_eq!(transport.calls()[0].topic, "planner.isAlive");
/// # }
/// ```
#[derive(Debug, Default)]
pub struct StaticRpc {
    outcomes: Mutex<HashMap<String, Result<Value, RpcError>>>,
    calls: Mutex<Vec<RpcRecord>>,
}

impl StaticRpc {
    /// Creates a transport with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a successful answer for `topic`.
    pub fn respond(&self, topic: impl Into<String>, value: Value) {
        self.outcomes.lock().insert(topic.into(), Ok(value));
    }

    /// Scripts a failing answer for `topic`.
    pub fn fail(&self, topic: impl Into<String>, error: RpcError) {
        self.outcomes.lock().insert(topic.into(), Err(error));
    }

    /// Returns every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RpcRecord> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl RpcTransport for StaticRpc {
    async fn call(&self, topic: &str, args: Value, timeout_ms: u64) -> Result<Value, RpcError> {
        self.calls.lock().push(RpcRecord {
            topic: topic.to_string(),
            args,
            timeout_ms,
        });

        match self.outcomes.lock().get(topic) {
            Some(outcome) => outcome.clone(),
            None => Err(RpcError::UnknownPeer(topic.to_string())),
        }
    }
}

/// Publisher that records instead of delivering.
///
/// `publish` logs the `(topic, value)` pair and reports one delivery
/// (the recorder itself is the lone sink).
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<(String, Value)>>,
}

impl RecordingPublisher {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every published `(topic, value)` pair, in order.
    #[must_use]
    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().clone()
    }

    /// Drops all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&self, topic: &str, value: &Value) -> usize {
        self.events.lock().push((topic.to_string(), value.clone()));
        1
    }
}

/// Builds an [`AppContext`] over a [`StaticRpc`] and a
/// [`RecordingPublisher`], returning all three.
///
/// The transport and publisher handles let the test script answers and
/// inspect what the application did with its context.
#[must_use]
pub fn test_context() -> (AppContext, Arc<StaticRpc>, Arc<RecordingPublisher>) {
    let rpc = Arc::new(StaticRpc::new());
    let streams = Arc::new(RecordingPublisher::new());
    let ctx = AppContext::new(RpcClient::new(rpc.clone()), streams.clone());
    (ctx, rpc, streams)
}
