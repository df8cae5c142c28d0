//! Remote-call responser.
//!
//! One responser per worker, shared by every connection and by the
//! control channel's `REMOTE_CALL_PROCEDURE` path. It is the single
//! place where an application fault becomes a wire-safe payload: the
//! procedure table is consulted, the handler runs, and any error comes
//! back as a structured [`Failure`] carrying the handler's error code.
//! Nothing a procedure does can take down the worker or the channel.

use std::sync::Arc;

use hive_app::ProcedureRegistry;
use hive_proto::{Call, CallOutcome, Failure};
use tracing::{debug, warn};

/// Executes inbound calls against the hosted application.
///
/// Cheap to clone; all clones share one procedure table.
#[derive(Debug, Clone)]
pub struct CallResponser {
    registry: Arc<ProcedureRegistry>,
}

impl CallResponser {
    /// Creates a responser over the application's procedure table.
    #[must_use]
    pub fn new(registry: Arc<ProcedureRegistry>) -> Self {
        Self { registry }
    }

    /// Runs one call to completion and returns its outcome.
    ///
    /// An unknown method or a failing handler becomes the outcome's
    /// failure case; this method itself never fails.
    pub async fn process(&self, call: Call) -> CallOutcome {
        debug!(method = %call.method, "processing call");
        match self.registry.dispatch(&call.method, call.args).await {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(method = %call.method, error = %err, "call failed");
                Err(Failure::from_error(&err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_app::testing::EchoApp;
    use hive_app::Application;
    use serde_json::json;

    fn responser() -> CallResponser {
        let app = EchoApp::new();
        let mut registry = ProcedureRegistry::new();
        app.procedures(&mut registry);
        CallResponser::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn echo_round_trips_arguments() {
        let outcome = responser()
            .process(Call::new("echo", json!({"n": 7})))
            .await;
        assert_eq!(outcome.unwrap(), json!({"n": 7}));
    }

    #[tokio::test]
    async fn unknown_method_becomes_structured_failure() {
        let outcome = responser().process(Call::new("missing", json!([]))).await;
        let failure = outcome.unwrap_err();
        assert_eq!(failure.code, "APP_METHOD_NOT_FOUND");
        assert!(failure.message.contains("missing"));
    }

    #[tokio::test]
    async fn handler_error_becomes_structured_failure() {
        let outcome = responser().process(Call::new("fail", json!([]))).await;
        let failure = outcome.unwrap_err();
        assert_eq!(failure.code, "APP_EXECUTION_FAILED");
    }

    #[tokio::test]
    async fn clones_share_one_table() {
        let responser = responser();
        let clone = responser.clone();
        let outcome = clone.process(Call::new("echo", json!([1, 2]))).await;
        assert_eq!(outcome.unwrap(), json!([1, 2]));
    }
}
