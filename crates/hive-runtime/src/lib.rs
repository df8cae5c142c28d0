//! Worker-process runtime for hive applications.
//!
//! This crate is the half the broker talks to: the [`Dispatcher`] that
//! owns one application's lifecycle, the [`AppFactory`] that constructs
//! it, the [`CallResponser`] and [`CallStreamer`] that serve calls and
//! streams, and the [`Gateway`] that exposes both over TCP. Application
//! authors never depend on this crate; they write against `hive-app`
//! and the runtime hosts the result.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SDK Layer                            │
//! │  hive-types : id newtypes, ErrorCode                        │
//! │  hive-proto : operations, frames, wire payloads             │
//! │  hive-app   : Application trait, registry, RPC seams        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                      Runtime Layer                          │
//! │  hive-runtime : dispatcher, factory, responser,  ◄── HERE   │
//! │                 streamer, gateway, mesh transport           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # One Worker, One Application
//!
//! ```text
//!                    broker (control channel)
//!                            │ raw JSON
//!                            ▼
//!                      ┌────────────┐   APP_CREATE    ┌────────────┐
//!                      │ Dispatcher │ ──────────────► │ AppFactory │
//!                      └────────────┘                 └────────────┘
//!                            │ APP_START                    │ builds
//!                            ▼                              ▼
//!                      ┌────────────┐  per socket   ┌───────────────┐
//!        TCP peers ──► │  Gateway   │ ────────────► │ CallResponser │
//!                      └────────────┘               │ CallStreamer  │
//!                                                   └───────────────┘
//! ```
//!
//! The dispatcher handles control operations strictly one at a time;
//! the gateway serves any number of concurrent peer connections, each
//! multiplexing calls and subscriptions over one socket. Outbound calls
//! ride the [`MeshTransport`], which resolves `<peer>.<method>` topics
//! through the process-wide [`PeerDirectory`].
//!
//! # Example
//!
//! ```
//! use hive_app::testing::EchoApp;
//! use hive_proto::{AppConfig, Operation};
//! use hive_runtime::{ControlMessage, Dispatcher, PeerDirectory};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (dispatcher, mut handle) = Dispatcher::with_blueprint(
//!     EchoApp::blueprint("echoes"),
//!     AppConfig::without_network(),
//!     Arc::new(PeerDirectory::new()),
//! );
//! let worker = tokio::spawn(dispatcher.run());
//!
//! handle.send(Operation::AppCreate).await.unwrap();
//! let created = handle.recv().await.unwrap();
//! assert_eq!(
//!     created,
//!     ControlMessage::Operation(Operation::AppCreateResponse(Ok(())))
//! );
//!
//! drop(handle);
//! worker.await.unwrap();
//! # }
//! ```
//!
//! # Crate Structure
//!
//! - [`Dispatcher`], [`ControlHandle`] - the control-channel state machine
//! - [`AppFactory`] - application construction and module validation
//! - [`CallResponser`] - inbound procedure calls
//! - [`CallStreamer`] - topic subscriptions and publishing
//! - [`Gateway`], [`ClientConnection`] - the TCP surface
//! - [`MeshTransport`], [`PeerDirectory`] - outbound calls to peers
//! - [`FactoryError`], [`GatewayError`], [`WorkerError`] - error types
//!
//! # Related Crates
//!
//! - [`hive_types`] - id newtypes and the `ErrorCode` trait
//! - [`hive_proto`] - wire payloads (operations, frames)
//! - [`hive_app`] - the SDK for the applications this crate hosts

mod control;
mod dispatcher;
mod error;
mod factory;
mod gateway;
mod responser;
mod rpc;
mod streamer;

pub use control::{ControlHandle, ControlMessage};
pub use dispatcher::{Dispatcher, WorkerState, GREET_PEER_TIMEOUT_MS};
pub use error::{FactoryError, GatewayError, WorkerError};
pub use factory::AppFactory;
pub use gateway::{ClientConnection, Gateway};
pub use responser::CallResponser;
pub use rpc::{MeshTransport, PeerDirectory};
pub use streamer::CallStreamer;
