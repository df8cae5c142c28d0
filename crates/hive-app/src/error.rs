//! Application layer errors.
//!
//! Two error families live here: [`AppError`] for failures inside an
//! application (lifecycle and procedure handlers) and [`RpcError`] for
//! failures of outbound calls to peer applications. Both implement
//! [`ErrorCode`] for unified handling.
//!
//! # Error Code Convention
//!
//! Application errors use the `APP_` prefix:
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`MethodNotFound`](AppError::MethodNotFound) | `APP_METHOD_NOT_FOUND` | No |
//! | [`BadArguments`](AppError::BadArguments) | `APP_BAD_ARGUMENTS` | No |
//! | [`ExecutionFailed`](AppError::ExecutionFailed) | `APP_EXECUTION_FAILED` | Yes |
//! | [`StartFailed`](AppError::StartFailed) | `APP_START_FAILED` | Yes |
//! | [`StopFailed`](AppError::StopFailed) | `APP_STOP_FAILED` | Yes |
//!
//! RPC client errors use the `RPC_` prefix:
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`UnknownPeer`](RpcError::UnknownPeer) | `RPC_UNKNOWN_PEER` | No |
//! | [`Timeout`](RpcError::Timeout) | `RPC_TIMEOUT` | Yes |
//! | [`Transport`](RpcError::Transport) | `RPC_TRANSPORT` | Yes |
//! | [`Remote`](RpcError::Remote) | `RPC_REMOTE_FAILURE` | No |
//!
//! # Recoverability
//!
//! - **Recoverable**: Retry may succeed (transient failures)
//! - **Not Recoverable**: Retry won't help (logic errors)
//!
//! # Example
//!
//! ```
//! use hive_app::AppError;
//! use hive_types::ErrorCode;
//!
//! let err = AppError::MethodNotFound("missing".into());
//! assert_eq!(err.code(), "APP_METHOD_NOT_FOUND");
//! assert!(!err.is_recoverable());
//!
//! let err = AppError::ExecutionFailed("timeout".into());
//! assert_eq!(err.code(), "APP_EXECUTION_FAILED");
//! assert!(err.is_recoverable());
//! ```

use hive_proto::Failure;
use hive_types::ErrorCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application layer error.
///
/// Returned by [`Application`](crate::Application) lifecycle methods and
/// by procedure handlers. The responser converts these into a wire
/// [`Failure`] before a result leaves the process, so a raw `AppError`
/// never crosses a channel.
///
/// # Variants
///
/// | Variant | When | Recovery |
/// |---------|------|----------|
/// | `MethodNotFound` | Call targets an unregistered procedure | Fix the call |
/// | `BadArguments` | Handler rejected the argument shape | Fix the call |
/// | `ExecutionFailed` | Handler ran and failed | May retry |
/// | `StartFailed` | `start()` rejected the transition | May retry |
/// | `StopFailed` | `stop()` rejected the transition | May retry |
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum AppError {
    /// No procedure is registered under the requested method name.
    ///
    /// **Not recoverable** - the method will stay unknown until the
    /// application registers it.
    #[error("no procedure named {0:?}")]
    MethodNotFound(String),

    /// A handler rejected the shape or content of its arguments.
    ///
    /// **Not recoverable** - fix the arguments.
    #[error("bad arguments: {0}")]
    BadArguments(String),

    /// A handler was found and invoked but failed while running.
    ///
    /// Common causes: downstream I/O failure, resource unavailable.
    ///
    /// **Recoverable** - retry may succeed.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The application refused to start.
    ///
    /// **Recoverable** - may succeed once the underlying condition clears.
    #[error("start failed: {0}")]
    StartFailed(String),

    /// The application refused to stop cleanly.
    ///
    /// **Recoverable** - a second stop attempt is legal.
    #[error("stop failed: {0}")]
    StopFailed(String),
}

impl ErrorCode for AppError {
    /// Returns a machine-readable error code.
    ///
    /// All application errors use the `APP_` prefix.
    fn code(&self) -> &'static str {
        match self {
            Self::MethodNotFound(_) => "APP_METHOD_NOT_FOUND",
            Self::BadArguments(_) => "APP_BAD_ARGUMENTS",
            Self::ExecutionFailed(_) => "APP_EXECUTION_FAILED",
            Self::StartFailed(_) => "APP_START_FAILED",
            Self::StopFailed(_) => "APP_STOP_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::ExecutionFailed(_) => true,
            Self::StartFailed(_) => true,
            Self::StopFailed(_) => true,
            Self::MethodNotFound(_) => false,
            Self::BadArguments(_) => false,
        }
    }
}

/// Outbound RPC error.
///
/// Produced by the RPC client when a call to a peer application cannot
/// complete. A peer that answered with a structured failure surfaces as
/// [`Remote`](RpcError::Remote) carrying the original [`Failure`], so the
/// caller can still branch on the remote error code.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum RpcError {
    /// The transport has no route to the named peer.
    ///
    /// **Not recoverable** - the peer must be registered first.
    #[error("no route to peer: {0}")]
    UnknownPeer(String),

    /// The call did not complete within its timeout.
    ///
    /// **Recoverable** - the peer may simply be slow.
    #[error("call to {topic} timed out after {timeout_ms}ms")]
    Timeout {
        /// Topic the call was addressed to.
        topic: String,
        /// Timeout that expired, in milliseconds.
        timeout_ms: u64,
    },

    /// The transport failed to deliver the call or its reply.
    ///
    /// Common causes: connection refused, socket closed mid-call.
    ///
    /// **Recoverable** - retry may succeed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The peer answered with a structured failure.
    ///
    /// **Not recoverable** - the peer made a deliberate decision; the
    /// inner code says why.
    #[error("remote failure: {0}")]
    Remote(Failure),
}

impl ErrorCode for RpcError {
    /// Returns a machine-readable error code.
    ///
    /// All RPC client errors use the `RPC_` prefix.
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownPeer(_) => "RPC_UNKNOWN_PEER",
            Self::Timeout { .. } => "RPC_TIMEOUT",
            Self::Transport(_) => "RPC_TRANSPORT",
            Self::Remote(_) => "RPC_REMOTE_FAILURE",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport(_) => true,
            Self::UnknownPeer(_) => false,
            Self::Remote(_) => false,
        }
    }
}
