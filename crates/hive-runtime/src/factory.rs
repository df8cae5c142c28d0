//! Application factory.
//!
//! The factory turns a blueprint plus a worker configuration into the one
//! live application instance a worker hosts. Construction is the
//! worker's startup contract:
//!
//! 1. validate every declared module (all-or-nothing, first offender
//!    reported)
//! 2. build the instance through the blueprint's constructor, injecting
//!    the RPC client and stream publisher via [`AppContext`]
//! 3. build the procedure table: `isAlive` is seeded first, then the
//!    application registers its own procedures (and may override the
//!    seed)
//!
//! The seeded `isAlive` procedure answers [`Application::is_alive`], which
//! is what makes a peer's `"<name>.isAlive"` greet probe resolvable over
//! the ordinary RPC path with no special casing in the gateway.

use std::fmt;
use std::sync::Arc;

use hive_app::{
    AppBlueprint, AppContext, AppError, Application, ProcedureRegistry, Publisher, RpcClient,
};
use hive_proto::{AppConfig, ModuleDescriptor};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::FactoryError;

/// One constructed application and its runtime handles.
///
/// # Example
///
/// ```
/// use hive_app::testing::{EchoApp, RecordingPublisher, StaticRpc};
/// use hive_app::RpcClient;
/// use hive_proto::{AppConfig, ModuleDescriptor};
/// use hive_runtime::AppFactory;
/// use std::sync::Arc;
///
/// let config = AppConfig::without_network()
///     .with_module(ModuleDescriptor::complete("TodoModule"));
/// let factory = AppFactory::construct(
///     &EchoApp::blueprint("echoes"),
///     &config,
///     RpcClient::new(Arc::new(StaticRpc::new())),
///     Arc::new(RecordingPublisher::new()),
/// )
/// .unwrap();
///
/// assert_eq!(factory.name(), "echoes");
/// assert!(factory.is_alive());
/// ```
pub struct AppFactory {
    name: String,
    app: Arc<dyn Application>,
    registry: Arc<ProcedureRegistry>,
    rpc: RpcClient,
    modules: Vec<ModuleDescriptor>,
}

impl AppFactory {
    /// Constructs the application from its blueprint and configuration.
    ///
    /// # Errors
    ///
    /// - [`FactoryError::InvalidModule`] if a descriptor in
    ///   `config.modules` is missing one of its required collections;
    ///   the first offender is reported and nothing is built
    /// - [`FactoryError::BuildFailed`] if the blueprint's constructor
    ///   rejects the context
    pub fn construct(
        blueprint: &AppBlueprint,
        config: &AppConfig,
        rpc: RpcClient,
        streams: Arc<dyn Publisher>,
    ) -> Result<Self, FactoryError> {
        validate_modules(&config.modules)?;

        let ctx = AppContext::new(rpc.clone(), streams);
        let app = blueprint
            .build(ctx)
            .map_err(|err| FactoryError::BuildFailed(err.to_string()))?;

        let mut registry = ProcedureRegistry::new();
        let probe = Arc::clone(&app);
        registry.register("isAlive", move |_args: Value| {
            let app = Arc::clone(&probe);
            async move { Ok(Value::Bool(app.is_alive())) }
        });
        app.procedures(&mut registry);
        debug!(
            app = blueprint.name(),
            procedures = registry.len(),
            "procedure table built"
        );

        info!(
            app = blueprint.name(),
            modules = config.modules.len(),
            "application constructed"
        );
        Ok(Self {
            name: blueprint.name().to_string(),
            app,
            registry: Arc::new(registry),
            rpc,
            modules: config.modules.clone(),
        })
    }

    /// Returns the application's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Starts the application.
    ///
    /// # Errors
    ///
    /// Whatever [`Application::start`] returns.
    pub async fn start(&self) -> Result<(), AppError> {
        self.app.start().await
    }

    /// Stops the application.
    ///
    /// # Errors
    ///
    /// Whatever [`Application::stop`] returns.
    pub async fn stop(&self) -> Result<(), AppError> {
        self.app.stop().await
    }

    /// Returns the application's own liveness answer.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.app.is_alive()
    }

    /// Returns the validated module descriptors, in declaration order.
    #[must_use]
    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    /// Returns the RPC client injected into the application.
    #[must_use]
    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// Returns a shared handle to the procedure table.
    #[must_use]
    pub fn registry(&self) -> Arc<ProcedureRegistry> {
        Arc::clone(&self.registry)
    }
}

impl fmt::Debug for AppFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppFactory")
            .field("name", &self.name)
            .field("modules", &self.modules)
            .field("registry", &self.registry)
            .finish()
    }
}

/// Rejects the first module whose required collections are not all declared.
fn validate_modules(modules: &[ModuleDescriptor]) -> Result<(), FactoryError> {
    for module in modules {
        let missing = module.missing_collections();
        if !missing.is_empty() {
            return Err(FactoryError::InvalidModule {
                module: module.name.clone(),
                missing: missing.join(", "),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_app::testing::{EchoApp, RecordingPublisher, StaticRpc};
    use hive_app::RpcTransport;
    use serde_json::json;

    fn build(config: &AppConfig) -> Result<AppFactory, FactoryError> {
        AppFactory::construct(
            &EchoApp::blueprint("echoes"),
            config,
            RpcClient::new(Arc::new(StaticRpc::new())),
            Arc::new(RecordingPublisher::new()),
        )
    }

    #[test]
    fn construct_with_complete_modules() {
        let config = AppConfig::without_network()
            .with_module(ModuleDescriptor::complete("TodoModule"))
            .with_module(ModuleDescriptor::complete("UserModule"));

        let factory = build(&config).unwrap();
        assert_eq!(factory.name(), "echoes");
        assert_eq!(factory.modules().len(), 2);
        assert_eq!(factory.modules()[0].name, "TodoModule");
        assert!(factory.is_alive());
    }

    #[test]
    fn incomplete_module_rejected_by_name() {
        let config = AppConfig::without_network()
            .with_module(ModuleDescriptor::complete("GoodModule"))
            .with_module(ModuleDescriptor::new("BadModule").with_models(["Todo"]));

        let err = build(&config).unwrap_err();
        match &err {
            FactoryError::InvalidModule { module, missing } => {
                assert_eq!(module, "BadModule");
                assert_eq!(missing, "services, components");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("BadModule"));
        assert!(err
            .to_string()
            .contains("{ models: [], services: [], components: [] }"));
    }

    #[test]
    fn first_invalid_module_wins() {
        let config = AppConfig::without_network()
            .with_module(ModuleDescriptor::new("FirstBad"))
            .with_module(ModuleDescriptor::new("SecondBad"));

        let err = build(&config).unwrap_err();
        assert!(err.to_string().contains("FirstBad"));
        assert!(!err.to_string().contains("SecondBad"));
    }

    #[tokio::test]
    async fn is_alive_seeded_into_registry() {
        let factory = build(&AppConfig::without_network()).unwrap();
        let registry = factory.registry();

        assert!(registry.contains("isAlive"));
        let alive = registry.dispatch("isAlive", json!([])).await.unwrap();
        assert_eq!(alive, json!(true));
    }

    #[tokio::test]
    async fn application_procedures_registered_after_seed() {
        let factory = build(&AppConfig::without_network()).unwrap();
        let registry = factory.registry();

        assert_eq!(registry.methods(), vec!["echo", "fail", "isAlive"]);
        let out = registry.dispatch("echo", json!(["hi"])).await.unwrap();
        assert_eq!(out, json!(["hi"]));
    }

    #[tokio::test]
    async fn lifecycle_passes_through() {
        let factory = build(&AppConfig::without_network()).unwrap();
        factory.start().await.unwrap();
        factory.stop().await.unwrap();
    }

    #[tokio::test]
    async fn rpc_client_reaches_injected_transport() {
        let transport = Arc::new(StaticRpc::new());
        transport.respond("planner.isAlive", json!(true));

        let factory = AppFactory::construct(
            &EchoApp::blueprint("echoes"),
            &AppConfig::without_network(),
            RpcClient::new(Arc::clone(&transport) as Arc<dyn RpcTransport>),
            Arc::new(RecordingPublisher::new()),
        )
        .unwrap();

        let alive = factory
            .rpc()
            .topic("planner.isAlive")
            .call(json!([]))
            .await
            .unwrap();
        assert_eq!(alive, json!(true));
        assert_eq!(transport.calls().len(), 1);
    }
}
