//! Application blueprints.
//!
//! A blueprint is what the broker deploys: the application's public
//! name plus a constructor that builds the instance once the worker
//! hands it an [`AppContext`]. The worker's factory invokes the
//! constructor exactly once per process lifetime, on `APP_CREATE`.
//!
//! Keeping construction behind a closure means the blueprint itself is
//! inert (no sockets, no tasks) until the worker decides to build.
//!
//! # Example
//!
//! ```
//! use hive_app::{AppBlueprint, Application};
//! use hive_app::testing::EchoApp;
//! use std::sync::Arc;
//!
//! let blueprint = AppBlueprint::new("echoes", |_ctx| {
//!     Ok(Arc::new(EchoApp::new()) as Arc<dyn Application>)
//! });
//! assert_eq!(blueprint.name(), "echoes");
//! ```

use crate::{AppContext, AppError, Application};
use std::fmt;
use std::sync::Arc;

type Constructor = dyn Fn(AppContext) -> Result<Arc<dyn Application>, AppError> + Send + Sync;

/// Named recipe for constructing one application.
///
/// The name doubles as the worker's identity on the mesh: peers greet
/// it by this name and topic addressing resolves it as the first
/// dotted segment.
pub struct AppBlueprint {
    name: String,
    constructor: Box<Constructor>,
}

impl AppBlueprint {
    /// Creates a blueprint from a name and a constructor.
    ///
    /// # Arguments
    ///
    /// * `name` - Public application name, unique per mesh
    /// * `constructor` - Builds the instance from the injected context
    #[must_use]
    pub fn new<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(AppContext) -> Result<Arc<dyn Application>, AppError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            constructor: Box::new(constructor),
        }
    }

    /// Returns the application's public name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the constructor against `ctx`.
    ///
    /// # Errors
    ///
    /// Whatever the constructor returns; a failed build leaves nothing
    /// behind to clean up.
    pub fn build(&self, ctx: AppContext) -> Result<Arc<dyn Application>, AppError> {
        (self.constructor)(ctx)
    }
}

impl fmt::Debug for AppBlueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppBlueprint")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_context, EchoApp};

    #[test]
    fn builds_a_fresh_instance_per_call() {
        let blueprint = EchoApp::blueprint("echoes");

        let (ctx, _, _) = test_context();
        let first = blueprint.build(ctx.clone()).unwrap();
        let second = blueprint.build(ctx).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn constructor_failure_surfaces() {
        let blueprint = AppBlueprint::new("doomed", |_ctx| {
            Err(AppError::ExecutionFailed("no database".into()))
        });

        let (ctx, _, _) = test_context();
        let err = blueprint.build(ctx).unwrap_err();
        assert!(err.to_string().contains("no database"));
    }

    #[test]
    fn debug_shows_name_only() {
        let blueprint = EchoApp::blueprint("echoes");
        let rendered = format!("{blueprint:?}");
        assert!(rendered.contains("echoes"));
        assert!(rendered.contains(".."));
    }
}
