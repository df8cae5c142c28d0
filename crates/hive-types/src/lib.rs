//! Core types for Hive.
//!
//! This crate provides the foundational identifier types and the shared
//! error-code contract for the Hive worker runtime (each application of a
//! distributed system runs as an isolated worker process under a broker).
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Application SDK Layer                       │
//! │  (What application authors depend on)                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  hive-types   : ID types, ErrorCode               ◄── HERE   │
//! │  hive-proto   : Operation, Call, Frame                       │
//! │  hive-app     : Application trait, RPC client seam           │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Runtime Layer                             │
//! │  (Worker-process internals, NOT for applications)            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  hive-runtime : dispatcher, responser, streamer, gateway    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Why a Separate Types Crate?
//!
//! The same identifiers appear on both sides of every boundary in the
//! system: a peer's call frame and the worker's reply frame share a
//! [`CallId`]; a subscribe acknowledgement and a later unsubscribe share
//! a [`SubscriptionId`]. Keeping them in one leaf crate means the
//! protocol, the SDK and the runtime agree on them without depending on
//! each other.
//!
//! # Identifier Design
//!
//! All identifiers are UUID-based for:
//!
//! - **Network compatibility**: Safe to transmit across processes/machines
//! - **No coordination**: Globally unique without a central allocator
//! - **Serialization**: First-class serde support
//!
//! # Example
//!
//! ```
//! use hive_types::{CallId, ConnectionId, SubscriptionId};
//!
//! // One id per remote call in flight
//! let call = CallId::new();
//!
//! // One id per accepted socket
//! let conn = ConnectionId::new();
//!
//! // One id per stream subscription
//! let sub = SubscriptionId::new();
//!
//! assert_ne!(call.uuid(), conn.uuid());
//! assert_ne!(conn.uuid(), sub.uuid());
//! ```

mod error;
mod id;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{CallId, ConnectionId, SubscriptionId};
