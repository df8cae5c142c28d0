//! Worker configuration types.
//!
//! An [`AppConfig`] is handed to the worker when the broker spawns it
//! and never changes afterwards. It also travels back over the control
//! channel verbatim as the `APP_PING_RESPONSE` payload, which is why it
//! lives in the protocol crate. Wire names are camelCase.

use serde::{Deserialize, Serialize};

/// Configuration for one worker-hosted application.
///
/// Immutable once the worker process starts. The dispatcher owns it;
/// the factory reads `modules` during validation and the gateway reads
/// `host`/`port`/`disable_network` during `APP_START`.
///
/// # Fields consumed by the core
///
/// | Field | Wire name | Used by |
/// |-------|-----------|---------|
/// | `host` | `host` | gateway bind |
/// | `port` | `port` | gateway bind (`0` = ephemeral) |
/// | `disable_network` | `disableNetwork` | skip gateway entirely |
/// | `modules` | `modules` | factory validation |
///
/// No other keys are read by the core.
///
/// # Example
///
/// ```
/// use hive_proto::{AppConfig, ModuleDescriptor};
///
/// let config = AppConfig::new("127.0.0.1", 0)
///     .with_module(ModuleDescriptor::complete("TodoModule"));
/// assert_eq!(config.modules.len(), 1);
/// assert!(!config.disable_network);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Interface the network listener binds.
    pub host: String,

    /// Port the network listener binds. `0` asks the OS for an
    /// ephemeral port; the bound address is observable on the gateway.
    pub port: u16,

    /// When `true` the worker never binds a listener: no accept loop,
    /// no network surface at all.
    pub disable_network: bool,

    /// Modules the application declares, in declaration order.
    pub modules: Vec<ModuleDescriptor>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            disable_network: false,
            modules: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Creates a config binding the given host and port.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Creates a config with the network listener disabled.
    ///
    /// # Example
    ///
    /// ```
    /// use hive_proto::AppConfig;
    ///
    /// let config = AppConfig::without_network();
    /// assert!(config.disable_network);
    /// ```
    #[must_use]
    pub fn without_network() -> Self {
        Self {
            disable_network: true,
            ..Self::default()
        }
    }

    /// Appends a module descriptor (builder style).
    #[must_use]
    pub fn with_module(mut self, module: ModuleDescriptor) -> Self {
        self.modules.push(module);
        self
    }

    /// Returns the `host:port` string the listener binds.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Names of the three collections every module must declare.
pub const MODULE_COLLECTIONS: [&str; 3] = ["models", "services", "components"];

/// One module declared by an application.
///
/// A well-formed module declares all three sub-collections, even if
/// they are empty:
///
/// ```json
/// { "name": "TodoModule", "models": [], "services": [], "components": [] }
/// ```
///
/// The collections are `Option`s because descriptors arrive from
/// configuration, where a section can simply be missing; that is
/// exactly the malformed shape the factory rejects at construction
/// time. The core never looks inside the collections; their entries
/// are meaningful only to the application author.
///
/// # Example
///
/// ```
/// use hive_proto::ModuleDescriptor;
///
/// let complete = ModuleDescriptor::complete("TodoModule");
/// assert!(complete.is_complete());
///
/// let partial = ModuleDescriptor::new("TodoModule").with_models(["Todo"]);
/// assert_eq!(partial.missing_collections(), vec!["services", "components"]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    /// Module identifier, used in validation error messages.
    pub name: String,

    /// Declared model names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<String>>,

    /// Declared service names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<String>>,

    /// Declared component names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<String>>,
}

impl ModuleDescriptor {
    /// Creates a descriptor that declares nothing.
    ///
    /// Useful as a builder seed and in tests exercising the rejection
    /// path; an application shipping this as-is fails construction.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            models: None,
            services: None,
            components: None,
        }
    }

    /// Creates a descriptor declaring all three collections, empty.
    ///
    /// The minimal well-formed module.
    #[must_use]
    pub fn complete(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            models: Some(Vec::new()),
            services: Some(Vec::new()),
            components: Some(Vec::new()),
        }
    }

    /// Sets the declared models (builder style).
    #[must_use]
    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = Some(models.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the declared services (builder style).
    #[must_use]
    pub fn with_services<I, S>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.services = Some(services.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the declared components (builder style).
    #[must_use]
    pub fn with_components<I, S>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.components = Some(components.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the names of the collections this module fails to
    /// declare, in [`MODULE_COLLECTIONS`] order.
    #[must_use]
    pub fn missing_collections(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.models.is_none() {
            missing.push(MODULE_COLLECTIONS[0]);
        }
        if self.services.is_none() {
            missing.push(MODULE_COLLECTIONS[1]);
        }
        if self.components.is_none() {
            missing.push(MODULE_COLLECTIONS[2]);
        }
        missing
    }

    /// Returns `true` if all three collections are declared.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_collections().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_config_is_loopback_ephemeral() {
        let config = AppConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 0);
        assert!(!config.disable_network);
        assert!(config.modules.is_empty());
    }

    #[test]
    fn addr_joins_host_and_port() {
        let config = AppConfig::new("0.0.0.0", 4321);
        assert_eq!(config.addr(), "0.0.0.0:4321");
    }

    #[test]
    fn wire_names_are_camel_case() {
        let config = AppConfig::without_network();
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["disableNetwork"], json!(true));
        assert!(value.get("disable_network").is_none());
    }

    #[test]
    fn config_round_trips_with_modules() {
        let config = AppConfig::new("127.0.0.1", 8080)
            .with_module(ModuleDescriptor::complete("TodoModule").with_models(["Todo"]));
        let encoded = serde_json::to_string(&config).unwrap();
        let decoded: AppConfig = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn absent_fields_fall_back_to_defaults() {
        let decoded: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(decoded, AppConfig::default());
    }

    #[test]
    fn complete_module_declares_everything() {
        let module = ModuleDescriptor::complete("TodoModule");
        assert!(module.is_complete());
        assert!(module.missing_collections().is_empty());
    }

    #[test]
    fn new_module_declares_nothing() {
        let module = ModuleDescriptor::new("TodoModule");
        assert!(!module.is_complete());
        assert_eq!(
            module.missing_collections(),
            vec!["models", "services", "components"]
        );
    }

    #[test]
    fn partial_module_reports_only_missing() {
        let module = ModuleDescriptor::new("TodoModule")
            .with_models(["Todo"])
            .with_components(["TodoComponent"]);
        assert_eq!(module.missing_collections(), vec!["services"]);
    }

    #[test]
    fn undeclared_collection_survives_round_trip() {
        // A missing section must stay missing, not become an empty vec
        let decoded: ModuleDescriptor =
            serde_json::from_str(r#"{"name": "M", "models": []}"#).unwrap();
        assert_eq!(decoded.models, Some(Vec::new()));
        assert!(decoded.services.is_none());
        assert!(decoded.components.is_none());

        let encoded = serde_json::to_value(&decoded).unwrap();
        assert!(encoded.get("services").is_none());
    }
}
