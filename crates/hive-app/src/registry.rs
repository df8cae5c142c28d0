//! Explicit procedure registration table.
//!
//! Applications expose remote procedures by registering async handlers
//! under string method names. Dispatch is a plain table lookup: a name
//! that was never registered is an [`AppError::MethodNotFound`], not a
//! reflective search over the application object.
//!
//! The registry is built mutably during application construction and
//! frozen afterwards (the runtime wraps it in an `Arc`), so dispatch
//! needs only `&self` and can run from many connections at once.
//!
//! # Example
//!
//! ```
//! use hive_app::ProcedureRegistry;
//! use serde_json::{json, Value};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut registry = ProcedureRegistry::new();
//! registry.register("echo", |args: Value| async move { Ok(args) });
//!
//! let out = registry.dispatch("echo", json!(["hello"])).await;
//! assert_eq!(out.unwrap(), json!(["hello"]));
//!
//! let missing = registry.dispatch("nope", Value::Null).await;
//! assert!(missing.is_err());
//! # }
//! ```

use crate::AppError;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Boxed handler stored in the table. Each invocation returns an owned
/// future so one handler can service overlapping calls.
type BoxedProcedure =
    Box<dyn Fn(Value) -> Pin<Box<dyn Future<Output = Result<Value, AppError>> + Send>> + Send + Sync>;

/// Method-name → handler table for one application.
///
/// # Registration Semantics
///
/// - Names are exact strings; dotted names (`"TodoService.addTodo"`) are
///   legal and treated opaquely.
/// - Registering a name twice replaces the earlier handler.
/// - Handlers receive the call's `args` value unparsed and return either
///   a result value or an [`AppError`].
#[derive(Default)]
pub struct ProcedureRegistry {
    procedures: HashMap<String, BoxedProcedure>,
}

impl ProcedureRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an async handler under `method`.
    ///
    /// Replaces any handler previously registered under the same name.
    ///
    /// # Arguments
    ///
    /// * `method` - Method name clients will call
    /// * `handler` - Async function from the call's arguments to its result
    pub fn register<F, Fut>(&mut self, method: impl Into<String>, handler: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, AppError>> + Send + 'static,
    {
        self.procedures
            .insert(method.into(), Box::new(move |args| Box::pin(handler(args))));
    }

    /// Returns `true` if a handler is registered under `method`.
    #[must_use]
    pub fn contains(&self, method: &str) -> bool {
        self.procedures.contains_key(method)
    }

    /// Returns all registered method names, sorted.
    #[must_use]
    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.procedures.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered procedures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    /// Invokes the handler registered under `method` with `args`.
    ///
    /// # Errors
    ///
    /// - [`AppError::MethodNotFound`] if no handler is registered
    /// - Whatever the handler itself returns
    pub async fn dispatch(&self, method: &str, args: Value) -> Result<Value, AppError> {
        match self.procedures.get(method) {
            Some(handler) => handler(args).await,
            None => Err(AppError::MethodNotFound(method.to_string())),
        }
    }
}

impl fmt::Debug for ProcedureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureRegistry")
            .field("methods", &self.methods())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_types::ErrorCode;
    use serde_json::json;

    fn echo_registry() -> ProcedureRegistry {
        let mut registry = ProcedureRegistry::new();
        registry.register("echo", |args: Value| async move { Ok(args) });
        registry
    }

    #[tokio::test]
    async fn dispatch_invokes_handler() {
        let registry = echo_registry();
        let out = registry.dispatch("echo", json!(["hi"])).await;
        assert_eq!(out.unwrap(), json!(["hi"]));
    }

    #[tokio::test]
    async fn dispatch_unknown_method() {
        let registry = echo_registry();
        let err = registry.dispatch("missing", Value::Null).await.unwrap_err();
        assert_eq!(err.code(), "APP_METHOD_NOT_FOUND");
        assert!(err.to_string().contains("\"missing\""));
    }

    #[tokio::test]
    async fn handler_errors_pass_through() {
        let mut registry = ProcedureRegistry::new();
        registry.register("fail", |_args: Value| async move {
            Err(AppError::ExecutionFailed("boom".into()))
        });

        let err = registry.dispatch("fail", Value::Null).await.unwrap_err();
        assert_eq!(err.code(), "APP_EXECUTION_FAILED");
    }

    #[tokio::test]
    async fn re_registration_replaces() {
        let mut registry = ProcedureRegistry::new();
        registry.register("version", |_args: Value| async move { Ok(json!(1)) });
        registry.register("version", |_args: Value| async move { Ok(json!(2)) });

        assert_eq!(registry.len(), 1);
        let out = registry.dispatch("version", Value::Null).await.unwrap();
        assert_eq!(out, json!(2));
    }

    #[tokio::test]
    async fn handler_runs_per_invocation() {
        let registry = echo_registry();
        let first = registry.dispatch("echo", json!(1)).await.unwrap();
        let second = registry.dispatch("echo", json!(2)).await.unwrap();
        assert_eq!(first, json!(1));
        assert_eq!(second, json!(2));
    }

    #[test]
    fn methods_are_sorted() {
        let mut registry = ProcedureRegistry::new();
        registry.register("zeta", |args: Value| async move { Ok(args) });
        registry.register("alpha", |args: Value| async move { Ok(args) });
        registry.register("TodoService.addTodo", |args: Value| async move { Ok(args) });

        assert_eq!(registry.methods(), vec!["TodoService.addTodo", "alpha", "zeta"]);
        assert!(registry.contains("alpha"));
        assert!(!registry.contains("beta"));
    }

    #[test]
    fn empty_registry() {
        let registry = ProcedureRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.methods().is_empty());
    }

    #[test]
    fn debug_lists_methods() {
        let registry = echo_registry();
        let rendered = format!("{registry:?}");
        assert!(rendered.contains("echo"));
    }
}
