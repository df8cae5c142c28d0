//! Runtime layer errors.
//!
//! Three error families live here, one per runtime concern:
//! [`FactoryError`] for application construction, [`GatewayError`] for the
//! network listener, and [`WorkerError`] for the dispatcher's own rules.
//! All implement [`ErrorCode`] and cross the control channel as a
//! [`Failure`](hive_proto::Failure) via `Failure::from_error`, so the
//! broker always sees the stable code, never a raw fault.
//!
//! # Error Code Convention
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`FactoryError::InvalidModule`] | `FACTORY_INVALID_MODULE` | No |
//! | [`FactoryError::BuildFailed`] | `FACTORY_BUILD_FAILED` | No |
//! | [`GatewayError::Bind`] | `GATEWAY_BIND_FAILED` | Yes |
//! | [`WorkerError::DuplicateApplication`] | `WORKER_DUPLICATE_APPLICATION` | No |
//! | [`WorkerError::InvalidState`] | `WORKER_INVALID_STATE` | No |
//! | [`WorkerError::SendFailed`] | `WORKER_SEND_FAILED` | No |
//!
//! # Example
//!
//! ```
//! use hive_runtime::WorkerError;
//! use hive_types::ErrorCode;
//!
//! let err = WorkerError::DuplicateApplication { name: "todo".into() };
//! assert_eq!(err.code(), "WORKER_DUPLICATE_APPLICATION");
//! assert!(!err.is_recoverable());
//! ```

use hive_types::ErrorCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application construction error.
///
/// Produced by [`AppFactory::construct`](crate::AppFactory::construct).
/// Construction is all-or-nothing: on the first invalid module nothing is
/// built, and a constructor rejection leaves no partially wired instance
/// behind.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum FactoryError {
    /// A declared module is missing one of its required collections.
    ///
    /// The message names the offending module and the shape a module must
    /// declare, so a config author can fix it without reading source.
    ///
    /// **Not recoverable** - the descriptor stays malformed on retry.
    #[error(
        "invalid module {module:?}: missing {missing}; \
         a module must declare {{ models: [], services: [], components: [] }}"
    )]
    InvalidModule {
        /// Identifier of the first module that failed validation.
        module: String,
        /// Comma-separated names of the absent collections.
        missing: String,
    },

    /// The blueprint's constructor refused to build the application.
    ///
    /// **Not recoverable** - the same blueprint and context will refuse
    /// again.
    #[error("application constructor failed: {0}")]
    BuildFailed(String),
}

impl ErrorCode for FactoryError {
    /// Returns a machine-readable error code.
    ///
    /// All factory errors use the `FACTORY_` prefix.
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidModule { .. } => "FACTORY_INVALID_MODULE",
            Self::BuildFailed(_) => "FACTORY_BUILD_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// Network listener error.
///
/// Produced by [`Gateway::open`](crate::Gateway::open). Accept and
/// per-connection failures are handled inside the gateway's own tasks
/// (logged, connection dropped) and never surface here.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum GatewayError {
    /// The listener socket could not be bound.
    ///
    /// Common causes: port already in use, host not local.
    ///
    /// **Recoverable** - another process may release the port.
    #[error("failed to bind {addr}: {reason}")]
    Bind {
        /// The `host:port` that was requested.
        addr: String,
        /// Operating system error text.
        reason: String,
    },
}

impl ErrorCode for GatewayError {
    /// Returns a machine-readable error code.
    ///
    /// All gateway errors use the `GATEWAY_` prefix.
    fn code(&self) -> &'static str {
        match self {
            Self::Bind { .. } => "GATEWAY_BIND_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Bind { .. } => true,
        }
    }
}

/// Dispatcher rule violation.
///
/// These are the failures the dispatcher decides on its own, as opposed
/// to failures it relays from the factory, gateway or application.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum WorkerError {
    /// A second `APP_CREATE` arrived for a worker that already hosts an
    /// application. One worker process hosts exactly one instance for its
    /// whole lifetime.
    ///
    /// **Not recoverable** - the instance lives until the process exits.
    #[error("trying to add duplicated application {name:?}")]
    DuplicateApplication {
        /// Name of the application the worker already hosts.
        name: String,
    },

    /// An operation arrived in a state where it is not valid, for example
    /// `APP_START` before `APP_CREATE`.
    ///
    /// **Not recoverable** - the same operation in the same state will be
    /// rejected again; the broker must reorder, not retry.
    #[error("operation {operation} not valid in state {state}")]
    InvalidState {
        /// Kind tag of the rejected operation.
        operation: String,
        /// Dispatcher state at the time of arrival.
        state: String,
    },

    /// A control-channel message could not be delivered to the worker.
    ///
    /// **Not recoverable** - the worker side of the channel is gone.
    #[error("control send failed: {0}")]
    SendFailed(String),
}

impl ErrorCode for WorkerError {
    /// Returns a machine-readable error code.
    ///
    /// All dispatcher errors use the `WORKER_` prefix.
    fn code(&self) -> &'static str {
        match self {
            Self::DuplicateApplication { .. } => "WORKER_DUPLICATE_APPLICATION",
            Self::InvalidState { .. } => "WORKER_INVALID_STATE",
            Self::SendFailed(_) => "WORKER_SEND_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_types::assert_error_codes;

    /// All variants for exhaustive testing
    fn all_factory_variants() -> Vec<FactoryError> {
        vec![
            FactoryError::InvalidModule {
                module: "x".into(),
                missing: "services, components".into(),
            },
            FactoryError::BuildFailed("x".into()),
        ]
    }

    fn all_gateway_variants() -> Vec<GatewayError> {
        vec![GatewayError::Bind {
            addr: "127.0.0.1:80".into(),
            reason: "permission denied".into(),
        }]
    }

    fn all_worker_variants() -> Vec<WorkerError> {
        vec![
            WorkerError::DuplicateApplication { name: "x".into() },
            WorkerError::InvalidState {
                operation: "APP_START".into(),
                state: "Uninitialized".into(),
            },
            WorkerError::SendFailed("x".into()),
        ]
    }

    #[test]
    fn all_factory_error_codes_valid() {
        assert_error_codes(&all_factory_variants(), "FACTORY_");
    }

    #[test]
    fn all_gateway_error_codes_valid() {
        assert_error_codes(&all_gateway_variants(), "GATEWAY_");
    }

    #[test]
    fn all_worker_error_codes_valid() {
        assert_error_codes(&all_worker_variants(), "WORKER_");
    }

    #[test]
    fn invalid_module_names_module_and_shape() {
        let err = FactoryError::InvalidModule {
            module: "BillingModule".into(),
            missing: "services, components".into(),
        };
        let text = err.to_string();
        assert!(text.contains("BillingModule"));
        assert!(text.contains("{ models: [], services: [], components: [] }"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn bind_failure_is_recoverable() {
        let err = GatewayError::Bind {
            addr: "127.0.0.1:9000".into(),
            reason: "address in use".into(),
        };
        assert_eq!(err.code(), "GATEWAY_BIND_FAILED");
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("127.0.0.1:9000"));
    }

    #[test]
    fn duplicate_application_message_is_stable() {
        let err = WorkerError::DuplicateApplication {
            name: "todo".into(),
        };
        assert!(err
            .to_string()
            .contains("trying to add duplicated application"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn invalid_state_names_operation_and_state() {
        let err = WorkerError::InvalidState {
            operation: "APP_START".into(),
            state: "Uninitialized".into(),
        };
        assert!(err.to_string().contains("APP_START"));
        assert!(err.to_string().contains("Uninitialized"));
    }

    #[test]
    fn errors_round_trip_through_json() {
        let err = WorkerError::DuplicateApplication {
            name: "todo".into(),
        };
        let json = serde_json::to_string(&err).unwrap();
        let back: WorkerError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code(), "WORKER_DUPLICATE_APPLICATION");
    }
}
