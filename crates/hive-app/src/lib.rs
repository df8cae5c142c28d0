//! Application SDK for hive workers.
//!
//! This crate is what application authors depend on: the
//! [`Application`] trait, the [`AppBlueprint`] the broker deploys, and
//! the seams through which an application reaches the rest of the mesh.
//! The worker runtime lives elsewhere; nothing here opens a socket or
//! spawns a task.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SDK Layer                            │
//! │  (what application authors depend on)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  hive-types : id newtypes, ErrorCode                        │
//! │  hive-proto : operations, frames, wire payloads             │
//! │  hive-app   : Application trait, registry, RPC  ◄── HERE    │
//! ├─────────────────────────────────────────────────────────────┤
//! │                      Runtime Layer                          │
//! │  hive-runtime : dispatcher, factory, responser, streamer,   │
//! │                 gateway (implements the seams below)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Seams
//!
//! The SDK declares two traits the runtime implements; applications
//! receive them pre-wired in their [`AppContext`]:
//!
//! | Seam | Runtime implementation | Test double |
//! |------|------------------------|-------------|
//! | [`RpcTransport`] | TCP mesh transport | [`testing::StaticRpc`] |
//! | [`Publisher`] | topic streamer | [`testing::RecordingPublisher`] |
//!
//! # Application Lifetime
//!
//! One instance per worker process: the blueprint's constructor runs on
//! `APP_CREATE`, `start`/`stop` follow the broker's lifecycle
//! operations, and the instance lives until the process exits. The
//! procedures registered at construction are the application's entire
//! callable surface.
//!
//! # Example
//!
//! ```
//! use async_trait::async_trait;
//! use hive_app::testing::test_context;
//! use hive_app::{AppBlueprint, AppError, Application, ProcedureRegistry};
//! use serde_json::{json, Value};
//! use std::sync::Arc;
//!
//! #[derive(Debug, Default)]
//! struct TodoApp;
//!
//! #[async_trait]
//! impl Application for TodoApp {
//!     async fn start(&self) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     async fn stop(&self) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn procedures(&self, registry: &mut ProcedureRegistry) {
//!         registry.register("addTodo", |args: Value| async move { Ok(args) });
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let blueprint = AppBlueprint::new("todos", |_ctx| {
//!     Ok(Arc::new(TodoApp) as Arc<dyn Application>)
//! });
//!
//! let (ctx, _, _) = test_context();
//! let app = blueprint.build(ctx).unwrap();
//!
//! let mut registry = ProcedureRegistry::new();
//! app.procedures(&mut registry);
//!
//! let out = registry.dispatch("addTodo", json!([{"text": "read"}])).await;
//! assert!(out.is_ok());
//! # }
//! ```
//!
//! # Crate Structure
//!
//! - [`Application`], [`AppContext`] - the trait and its injected capabilities
//! - [`AppBlueprint`] - name + constructor, what the broker deploys
//! - [`ProcedureRegistry`] - explicit method → handler table
//! - [`RpcClient`], [`RpcTopic`], [`RpcTransport`] - calls to peers
//! - [`Publisher`] - stream publishing seam
//! - [`AppError`], [`RpcError`] - error types
//! - [`testing`] - doubles for all of the above
//!
//! # Related Crates
//!
//! - [`hive_types`] - id newtypes and the `ErrorCode` trait
//! - [`hive_proto`] - wire payloads (`Call`, `Failure`, operations)
//! - `hive-runtime` - the worker that hosts applications

mod application;
mod blueprint;
mod error;
mod registry;
mod rpc;
mod streams;

pub mod testing;

pub use application::{AppContext, Application};
pub use blueprint::AppBlueprint;
pub use error::{AppError, RpcError};
pub use registry::ProcedureRegistry;
pub use rpc::{RpcClient, RpcTopic, RpcTransport};
pub use streams::Publisher;

// Re-exported for implementors of [`Application`] and the seam traits.
pub use async_trait::async_trait;

// Re-export the default call timeout next to the client that applies it.
pub use hive_proto::DEFAULT_CALL_TIMEOUT_MS;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_context, EchoApp};
    use hive_types::ErrorCode;
    use serde_json::{json, Value};
    use std::sync::Arc;

    /// Builds an application the way the runtime's factory does:
    /// blueprint + context, then procedures into a frozen registry.
    fn build_echo() -> (Arc<dyn Application>, ProcedureRegistry) {
        let blueprint = EchoApp::blueprint("echoes");
        let (ctx, _, _) = test_context();
        let app = blueprint.build(ctx).unwrap();

        let mut registry = ProcedureRegistry::new();
        app.procedures(&mut registry);
        (app, registry)
    }

    #[tokio::test]
    async fn blueprint_to_dispatch_round_trip() {
        let (app, registry) = build_echo();
        app.start().await.unwrap();

        let out = registry.dispatch("echo", json!(["x"])).await.unwrap();
        assert_eq!(out, json!(["x"]));

        app.stop().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_method_is_structured() {
        let (_app, registry) = build_echo();

        let err = registry.dispatch("renameTodo", Value::Null).await.unwrap_err();
        assert_eq!(err.code(), "APP_METHOD_NOT_FOUND");
    }

    #[tokio::test]
    async fn context_reaches_peers_and_streams() {
        let (ctx, rpc, streams) = test_context();
        rpc.respond("planner.isAlive", json!(true));

        let alive = ctx
            .rpc()
            .topic("planner.isAlive")
            .with_timeout(5_000)
            .call(json!([]))
            .await
            .unwrap();
        assert_eq!(alive, json!(true));
        assert_eq!(rpc.calls()[0].timeout_ms, 5_000);

        ctx.publish("todos", &json!({"text": "ship"}));
        assert_eq!(streams.events().len(), 1);
    }

    #[tokio::test]
    async fn default_timeout_travels_with_topic() {
        let (ctx, rpc, _) = test_context();
        rpc.respond("peer.m", Value::Null);

        ctx.rpc().topic("peer.m").call(Value::Null).await.unwrap();
        assert_eq!(rpc.calls()[0].timeout_ms, DEFAULT_CALL_TIMEOUT_MS);
    }
}
