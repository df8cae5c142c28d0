//! Operation dispatcher - the worker's control-channel state machine.
//!
//! One dispatcher per worker process. It owns the configuration, the
//! application blueprint and, once `APP_CREATE` has run, the per-worker
//! core (factory + responser + streamer + gateway). Operations are
//! handled strictly one at a time, in arrival order, by the run loop:
//!
//! ```text
//! Uninitialized --APP_CREATE--> Created --APP_START--> Started
//!                                  ▲                       │
//!                                  └───────APP_STOP────────┴──> Stopped
//! ```
//!
//! `APP_PING` answers in every state; `REMOTE_CALL_PROCEDURE` is valid
//! whenever an application instance exists and is not stopped;
//! `APP_GREET` probes peers concurrently but the greet itself still
//! occupies the control channel until it resolves. Failed transitions
//! leave the state unchanged and carry their failure in the response,
//! never a crash.
//!
//! # Usage
//!
//! ```no_run
//! use hive_app::testing::EchoApp;
//! use hive_proto::{AppConfig, Operation};
//! use hive_runtime::{Dispatcher, PeerDirectory};
//! use std::sync::Arc;
//!
//! # async fn demo() {
//! let (dispatcher, handle) = Dispatcher::with_blueprint(
//!     EchoApp::blueprint("echoes"),
//!     AppConfig::new("127.0.0.1", 0),
//!     Arc::new(PeerDirectory::new()),
//! );
//! tokio::spawn(dispatcher.run());
//!
//! handle.send(Operation::AppCreate).await.unwrap();
//! handle.send(Operation::AppStart).await.unwrap();
//! # }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use hive_app::{AppBlueprint, Publisher, RpcClient, RpcTopic};
use hive_proto::{
    AppConfig, Call, CallOutcome, Failure, LifecycleOutcome, Operation, OperationKind,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::control::{ControlHandle, ControlMessage};
use crate::error::WorkerError;
use crate::factory::AppFactory;
use crate::gateway::Gateway;
use crate::responser::CallResponser;
use crate::rpc::{MeshTransport, PeerDirectory};
use crate::streamer::CallStreamer;

/// Control channel buffer size.
///
/// 256 operations is generous for a channel that is drained one
/// operation at a time; a broker that outruns it is backpressured,
/// not dropped.
const CONTROL_BUFFER_SIZE: usize = 256;

/// Upper bound on one greet probe, per peer.
///
/// The RPC client carries its own call timeout; this bound is the
/// dispatcher's guarantee that a greet resolves even if a transport
/// misbehaves, since a timed-out peer simply counts as down.
pub const GREET_PEER_TIMEOUT_MS: u64 = 5_000;

/// Lifecycle state of one worker process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// No application yet; only `APP_CREATE` and `APP_PING` succeed.
    Uninitialized,
    /// Application constructed but not started.
    Created,
    /// Application running, listener up unless the config disabled it.
    Started,
    /// Application stopped; the worker lingers until the process exits.
    Stopped,
}

impl WorkerState {
    /// Returns the state's name for logs and failure payloads.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "Uninitialized",
            Self::Created => "Created",
            Self::Started => "Started",
            Self::Stopped => "Stopped",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything `APP_CREATE` builds, in one place.
///
/// Holding the trio in one struct makes the duplicate-create guard a
/// plain `is_some()` check and guarantees the responser and streamer
/// can never outlive the application they serve.
struct WorkerCore {
    factory: AppFactory,
    responser: CallResponser,
    streamer: Arc<CallStreamer>,
    gateway: Option<Gateway>,
}

/// The worker-process control-channel handler.
///
/// Constructed together with its [`ControlHandle`], then consumed by
/// [`run`](Self::run):
///
/// ```text
/// let (dispatcher, handle) = Dispatcher::with_blueprint(...);
/// tokio::spawn(dispatcher.run());
/// ```
pub struct Dispatcher {
    blueprint: AppBlueprint,
    config: AppConfig,
    directory: Arc<PeerDirectory>,
    state: WorkerState,
    core: Option<WorkerCore>,
    op_rx: mpsc::Receiver<Value>,
    msg_tx: mpsc::Sender<ControlMessage>,
}

impl Dispatcher {
    /// Creates a dispatcher for one application blueprint.
    ///
    /// Returns the dispatcher and the broker-facing control handle. The
    /// configuration is immutable for the worker's lifetime; `APP_PING`
    /// serves it back verbatim.
    #[must_use]
    pub fn with_blueprint(
        blueprint: AppBlueprint,
        config: AppConfig,
        directory: Arc<PeerDirectory>,
    ) -> (Self, ControlHandle) {
        let (op_tx, op_rx) = mpsc::channel(CONTROL_BUFFER_SIZE);
        let (msg_tx, msg_rx) = mpsc::channel(CONTROL_BUFFER_SIZE);
        let dispatcher = Self {
            blueprint,
            config,
            directory,
            state: WorkerState::Uninitialized,
            core: None,
            op_rx,
            msg_tx,
        };
        (dispatcher, ControlHandle::new(op_tx, msg_rx))
    }

    /// Runs the control loop until the broker side hangs up.
    ///
    /// Operations are handled strictly in arrival order; a suspension
    /// point inside one operation (application `start()`, a remote
    /// procedure body) suspends only that operation's handling, but no
    /// second operation begins before the current one resolves.
    pub async fn run(mut self) {
        info!(app = self.blueprint.name(), "dispatcher started");

        while let Some(raw) = self.op_rx.recv().await {
            let Some(message) = self.handle_raw(raw).await else {
                continue;
            };
            if self.msg_tx.send(message).await.is_err() {
                warn!("broker hung up, dispatcher exiting");
                break;
            }
        }

        info!(
            app = self.blueprint.name(),
            state = %self.state,
            "dispatcher stopped"
        );
    }

    /// Decodes and handles one inbound value.
    ///
    /// Returns the message to send back, or `None` for inbound response
    /// operations, which are logged and ignored.
    async fn handle_raw(&mut self, raw: Value) -> Option<ControlMessage> {
        let op = match Operation::decode(&raw) {
            Ok(op) => op,
            Err(err) => {
                warn!(error = %err, "malformed operation");
                return Some(ControlMessage::Diagnostic(format!(
                    "malformed operation: {err}"
                )));
            }
        };

        debug!(kind = %op.kind(), state = %self.state, "operation received");
        let response = match op {
            Operation::AppCreate => Operation::AppCreateResponse(self.handle_create()),
            Operation::AppStart => Operation::AppStartResponse(self.handle_start().await),
            Operation::AppStop => Operation::AppStopResponse(self.handle_stop().await),
            Operation::RemoteCallProcedure(call) => {
                Operation::RemoteCallProcedureResponse(self.handle_call(call).await)
            }
            Operation::AppGreet(peers) => {
                Operation::AppGreetResponse(self.handle_greet(peers).await)
            }
            Operation::AppPing => Operation::AppPingResponse(self.config.clone()),
            response => {
                warn!(kind = %response.kind(), "inbound response operation ignored");
                return None;
            }
        };
        Some(ControlMessage::Operation(response))
    }

    /// `Uninitialized → Created`: builds the factory, responser and
    /// streamer. A second create is rejected without touching the
    /// existing instance.
    fn handle_create(&mut self) -> LifecycleOutcome {
        if self.core.is_some() {
            let err = WorkerError::DuplicateApplication {
                name: self.blueprint.name().to_string(),
            };
            error!(app = self.blueprint.name(), "application already created");
            return Err(Failure::from_error(&err));
        }

        let streamer = Arc::new(CallStreamer::new());
        let transport = Arc::new(MeshTransport::new(Arc::clone(&self.directory)));
        let rpc = RpcClient::new(transport);
        let factory = match AppFactory::construct(
            &self.blueprint,
            &self.config,
            rpc,
            Arc::clone(&streamer) as Arc<dyn Publisher>,
        ) {
            Ok(factory) => factory,
            Err(err) => {
                error!(error = %err, "application construction failed");
                return Err(Failure::from_error(&err));
            }
        };
        let responser = CallResponser::new(factory.registry());

        self.core = Some(WorkerCore {
            factory,
            responser,
            streamer,
            gateway: None,
        });
        self.state = WorkerState::Created;
        info!(app = self.blueprint.name(), "application created");
        Ok(())
    }

    /// `Created → Started`: listener and application come up together;
    /// both must succeed or the transition fails as a whole and the
    /// succeeded leg is unwound.
    async fn handle_start(&mut self) -> LifecycleOutcome {
        if self.state != WorkerState::Created {
            return Err(state_failure(self.state, OperationKind::AppStart));
        }
        let core = match self.core.as_mut() {
            Some(core) => core,
            None => return Err(state_failure(self.state, OperationKind::AppStart)),
        };

        let disable_network = self.config.disable_network;
        let addr = self.config.addr();
        let responser = core.responser.clone();
        let streamer = Arc::clone(&core.streamer);
        let listener_leg = async move {
            if disable_network {
                debug!("network disabled, no listener");
                Ok(None)
            } else {
                Gateway::open(&addr, responser, streamer).await.map(Some)
            }
        };

        match tokio::join!(listener_leg, core.factory.start()) {
            (Ok(gateway), Ok(())) => {
                if let Some(gateway) = gateway.as_ref() {
                    self.directory
                        .register(self.blueprint.name(), gateway.local_addr());
                }
                core.gateway = gateway;
                self.state = WorkerState::Started;
                info!(app = self.blueprint.name(), "application started");
                Ok(())
            }
            (Err(err), app_result) => {
                error!(error = %err, "listener failed to start");
                match app_result {
                    // The application came up; take it back down so
                    // `Created` still means "not started".
                    Ok(()) => {
                        if let Err(stop_err) = core.factory.stop().await {
                            warn!(error = %stop_err, "unwind stop failed");
                        }
                    }
                    Err(app_err) => {
                        error!(error = %app_err, "application start also failed");
                    }
                }
                Err(Failure::from_error(&err))
            }
            (Ok(gateway), Err(err)) => {
                error!(error = %err, "application start failed");
                if let Some(gateway) = gateway {
                    gateway.shutdown().await;
                }
                Err(Failure::from_error(&err))
            }
        }
    }

    /// `{Created, Started} → Stopped`: listener goes first so no new
    /// work is admitted while the application winds down.
    async fn handle_stop(&mut self) -> LifecycleOutcome {
        if !matches!(self.state, WorkerState::Created | WorkerState::Started) {
            return Err(state_failure(self.state, OperationKind::AppStop));
        }
        let core = match self.core.as_mut() {
            Some(core) => core,
            None => return Err(state_failure(self.state, OperationKind::AppStop)),
        };

        if let Some(gateway) = core.gateway.take() {
            gateway.shutdown().await;
            self.directory.deregister(self.blueprint.name());
        }

        if let Err(err) = core.factory.stop().await {
            error!(error = %err, "application stop failed");
            return Err(Failure::from_error(&err));
        }

        self.state = WorkerState::Stopped;
        info!(app = self.blueprint.name(), "application stopped");
        Ok(())
    }

    /// Delegates one call to the responser.
    async fn handle_call(&self, call: Call) -> CallOutcome {
        match self.core.as_ref() {
            Some(core) if matches!(self.state, WorkerState::Created | WorkerState::Started) => {
                core.responser.process(call).await
            }
            _ => Err(state_failure(
                self.state,
                OperationKind::RemoteCallProcedure,
            )),
        }
    }

    /// Probes every named peer except this worker itself, concurrently,
    /// and reports one boolean per remaining peer in request order.
    async fn handle_greet(&self, peers: Vec<String>) -> Vec<bool> {
        let own = self.blueprint.name();
        let targets: Vec<String> = peers
            .into_iter()
            .filter(|peer| peer.as_str() != own)
            .collect();

        let rpc = match self.core.as_ref() {
            Some(core) => core.factory.rpc().clone(),
            None => {
                warn!("greet before creation, reporting all peers down");
                return vec![false; targets.len()];
            }
        };

        info!(peers = targets.len(), "greeting peers");
        let probes: Vec<_> = targets
            .iter()
            .map(|peer| tokio::spawn(probe_peer(rpc.topic(format!("{peer}.isAlive")))))
            .collect();

        // Join in spawn order so the booleans line up with the request.
        let mut alive = Vec::with_capacity(probes.len());
        for (peer, probe) in targets.iter().zip(probes) {
            let up = probe.await.unwrap_or(false);
            debug!(peer = peer.as_str(), alive = up, "peer probed");
            alive.push(up);
        }
        alive
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("app", &self.blueprint.name())
            .field("state", &self.state)
            .finish()
    }
}

/// Builds the invalid-state failure for a rejected operation.
fn state_failure(state: WorkerState, operation: OperationKind) -> Failure {
    let err = WorkerError::InvalidState {
        operation: operation.as_str().to_string(),
        state: state.to_string(),
    };
    warn!(operation = operation.as_str(), %state, "operation rejected");
    Failure::from_error(&err)
}

/// One greet probe: `<peer>.isAlive` with the dispatcher's own bound on
/// top of the client's call timeout. Any failure is just "down".
async fn probe_peer(topic: RpcTopic) -> bool {
    let bound = Duration::from_millis(GREET_PEER_TIMEOUT_MS);
    match tokio::time::timeout(bound, topic.call(json!([]))).await {
        Ok(Ok(value)) => value.as_bool().unwrap_or(false),
        Ok(Err(err)) => {
            debug!(topic = topic.name(), error = %err, "peer probe failed");
            false
        }
        Err(_) => {
            debug!(
                topic = topic.name(),
                timeout_ms = GREET_PEER_TIMEOUT_MS,
                "peer probe timed out"
            );
            false
        }
    }
}
