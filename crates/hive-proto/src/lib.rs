//! Protocol types for Hive.
//!
//! This crate defines every message that crosses a process boundary in
//! the Hive runtime: the control-channel operations a broker exchanges
//! with its worker, the frames peers exchange with a worker's gateway,
//! and the configuration snapshot both sides agree on.
//!
//! # Crate Architecture
//!
//! This crate is part of the **Application SDK** layer:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Application SDK Layer                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  hive-types   : ID types, ErrorCode                          │
//! │  hive-proto   : Operation, Call, Frame  ◄── HERE             │
//! │  hive-app     : Application trait, RPC client seam           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Two Planes, Two Vocabularies
//!
//! ```text
//!                    ┌──────────────────────────────┐
//!   control plane    │            Broker            │
//!   Operation        └──────────────┬───────────────┘
//!   {"type","message"}              │ private channel
//!                                   ▼
//!                    ┌──────────────────────────────┐
//!                    │         Worker process       │
//!                    │  dispatcher → app lifecycle  │
//!                    └──────────────┬───────────────┘
//!   data plane                      │ TCP gateway
//!   Frame (JSON lines)              ▼
//!                    ┌──────────────────────────────┐
//!                    │  Peers: calls + stream subs  │
//!                    └──────────────────────────────┘
//! ```
//!
//! | Type | Plane | Carried by |
//! |------|-------|-----------|
//! | [`Operation`] | control | broker ↔ worker channel |
//! | [`Call`] | both | `REMOTE_CALL_PROCEDURE` and `Frame::Call` |
//! | [`Failure`] | both | every structured error payload |
//! | [`Frame`] | data | gateway connections |
//! | [`AppConfig`] | control | worker spawn and `APP_PING_RESPONSE` |
//!
//! # Error Handling
//!
//! Decode problems are [`ProtoError`]s with `PROTO_*` codes:
//!
//! ```
//! use hive_proto::{Operation, ProtoError};
//! use hive_types::ErrorCode;
//! use serde_json::json;
//!
//! let err = Operation::decode(&json!("ping")).unwrap_err();
//! assert_eq!(err.code(), "PROTO_NOT_AN_OBJECT");
//! ```
//!
//! # Usage
//!
//! ```
//! use hive_proto::{AppConfig, Call, ModuleDescriptor, Operation};
//! use serde_json::json;
//!
//! // The broker asks a worker to probe two peers
//! let greet = Operation::greet(["BillingApp", "TodoApp"]);
//!
//! // A peer invokes a procedure over the gateway
//! let call = Call::new("todo.add", json!({"text": "milk"}));
//!
//! // The config the worker was spawned with
//! let config = AppConfig::new("127.0.0.1", 0)
//!     .with_module(ModuleDescriptor::complete("TodoModule"));
//!
//! assert_eq!(greet.kind().to_string(), "APP_GREET");
//! assert_eq!(call.method, "todo.add");
//! assert!(!config.disable_network);
//! ```
//!
//! # Crate Structure
//!
//! - [`Operation`], [`OperationKind`], [`LifecycleOutcome`] - control channel
//! - [`Call`], [`CallOutcome`], [`Failure`] - procedure invocations
//! - [`Frame`] - gateway wire format
//! - [`AppConfig`], [`ModuleDescriptor`] - worker configuration
//! - [`ProtoError`] - decode/encode errors
//! - [`DEFAULT_CALL_TIMEOUT_MS`] - default RPC timeout

mod call;
mod config;
mod error;
mod frame;
mod operation;

pub use call::{Call, CallOutcome, Failure, DEFAULT_CALL_TIMEOUT_MS};
pub use config::{AppConfig, ModuleDescriptor, MODULE_COLLECTIONS};
pub use error::ProtoError;
pub use frame::Frame;
pub use operation::{LifecycleOutcome, Operation, OperationKind};

// Re-export from hive_types for convenience
pub use hive_types::{CallId, ConnectionId, SubscriptionId};
