//! Naming configuration for the host-facing surfaces the bridge touches.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default DOM event namespace and controller container used by Revel Digital players.
pub const DEFAULT_NAMESPACE: &str = "RevelDigital";
/// Default property name of the controller object installed under the namespace global.
pub const DEFAULT_CONTROLLER_PROPERTY: &str = "Controller";
/// Default name of the global host client object.
pub const DEFAULT_CLIENT_GLOBAL: &str = "Client";

/// Names of the globals and events shared with the player host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Prefix of the DOM custom events and name of the global controller container.
    pub namespace: String,
    /// Property of the namespace global that receives the controller object.
    pub controller_property: String,
    /// Name of the window global exposing the host client.
    pub client_global: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            controller_property: DEFAULT_CONTROLLER_PROPERTY.to_string(),
            client_global: DEFAULT_CLIENT_GLOBAL.to_string(),
        }
    }
}

impl BridgeConfig {
    /// Parses a config from JSON text; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when `raw` is not a valid config object.
    pub fn from_json_str(raw: &str) -> Result<Self, String> {
        match serde_json::from_str::<Value>(raw).map_err(|e| e.to_string())? {
            value @ Value::Object(_) => serde_json::from_value(value).map_err(|e| e.to_string()),
            other => Err(format!("expected a JSON object of bridge names, got `{other}`")),
        }
    }

    /// DOM event name signalling start.
    pub fn start_event(&self) -> String {
        format!("{}.Start", self.namespace)
    }

    /// DOM event name signalling stop.
    pub fn stop_event(&self) -> String {
        format!("{}.Stop", self.namespace)
    }

    /// DOM event name carrying a command.
    pub fn command_event(&self) -> String {
        format!("{}.Command", self.namespace)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_event_names() {
        let config = BridgeConfig::default();
        assert_eq!(config.start_event(), "RevelDigital.Start");
        assert_eq!(config.stop_event(), "RevelDigital.Stop");
        assert_eq!(config.command_event(), "RevelDigital.Command");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = BridgeConfig::from_json_str(r#"{"namespace":"Acme"}"#).expect("config");
        assert_eq!(config.namespace, "Acme");
        assert_eq!(config.controller_property, DEFAULT_CONTROLLER_PROPERTY);
        assert_eq!(config.client_global, DEFAULT_CLIENT_GLOBAL);
    }

    #[test]
    fn non_object_json_is_rejected() {
        for raw in ["[]", r#"["Acme"]"#, "null", "7", r#""Acme""#] {
            assert!(BridgeConfig::from_json_str(raw).is_err(), "{raw}");
        }
        assert!(BridgeConfig::from_json_str("{").is_err());
    }
}
