//! Typed access over gadget preference maps.
//!
//! Players deliver preference values loosely typed: numbers and booleans frequently arrive as
//! strings. Getters here accept both forms.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
/// Preference values keyed by preference name.
pub struct GadgetPrefs {
    values: Map<String, Value>,
}

impl From<Map<String, Value>> for GadgetPrefs {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl GadgetPrefs {
    /// Parses prefs from JSON object text.
    ///
    /// # Errors
    ///
    /// Returns an error when `raw` is not a JSON object.
    pub fn from_json_str(raw: &str) -> Result<Self, String> {
        match serde_json::from_str::<Value>(raw).map_err(|e| e.to_string())? {
            Value::Object(values) => Ok(Self { values }),
            other => Err(format!("expected a JSON object of prefs, got `{other}`")),
        }
    }

    /// Returns the raw value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns `key` as text; numbers and booleans are rendered.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    /// Returns `key` as a boolean, accepting `"true"`/`"false"` text.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key)? {
            Value::Bool(flag) => Some(*flag),
            Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns `key` as a float, accepting numeric text.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.values.get(key)? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns `key` as an integer, accepting integral text.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.values.get(key)? {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Deserializes `key` into `T`. Text holding JSON is decoded as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error when the value does not match `T`.
    pub fn get_typed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, String> {
        let Some(value) = self.values.get(key) else {
            return Ok(None);
        };
        let direct = serde_json::from_value::<T>(value.clone());
        match (direct, value) {
            (Ok(decoded), _) => Ok(Some(decoded)),
            (Err(_), Value::String(text)) => serde_json::from_str(text)
                .map(Some)
                .map_err(|e| format!("pref `{key}`: {e}")),
            (Err(err), _) => Err(format!("pref `{key}`: {err}")),
        }
    }

    /// Sets a pref value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Returns whether no prefs are present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrows the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Returns the underlying map.
    pub fn into_map(self) -> Map<String, Value> {
        self.values
    }
}
