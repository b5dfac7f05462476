//! Wire models exchanged with the player host and between gadget frames.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

/// A directive sent to or received from a player.
///
/// `arg` is opaque text. Callers that need structure encode it as JSON, see [`Command::json`] and
/// [`Command::parse_arg`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Command name.
    pub name: String,
    /// Opaque command payload.
    #[serde(default)]
    pub arg: String,
}

impl Command {
    /// Creates a command from a name and raw payload.
    pub fn new(name: impl Into<String>, arg: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arg: arg.into(),
        }
    }

    /// Creates a command whose payload is `value` encoded as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error when `value` cannot be serialized.
    pub fn json<T: Serialize>(name: impl Into<String>, value: &T) -> Result<Self, String> {
        let arg = serde_json::to_string(value).map_err(|e| e.to_string())?;
        Ok(Self::new(name, arg))
    }

    /// Decodes the payload as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error when the payload is not valid JSON for `T`.
    pub fn parse_arg<T: DeserializeOwned>(&self) -> Result<T, String> {
        serde_json::from_str(&self.arg).map_err(|e| e.to_string())
    }
}

/// Discriminator of a [`ConfigMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigMessageKind {
    /// Request to open the configuration UI.
    OpenConfig,
    /// Configuration edits to apply.
    ApplyConfig,
}

impl ConfigMessageKind {
    /// Returns the `type` token used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenConfig => "openConfig",
            Self::ApplyConfig => "applyConfig",
        }
    }
}

/// Configuration-UI lifecycle message exchanged over `postMessage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMessage {
    /// Message discriminator.
    #[serde(rename = "type")]
    pub kind: ConfigMessageKind,
    /// Preference values carried by the message.
    #[serde(default)]
    pub prefs: Map<String, Value>,
    /// `true` when the message originated in a popup and must be relayed further up.
    #[serde(rename = "isOpener", default)]
    pub is_opener: bool,
}

impl ConfigMessage {
    /// Builds an `applyConfig` message.
    pub fn apply(prefs: Map<String, Value>, is_opener: bool) -> Self {
        Self {
            kind: ConfigMessageKind::ApplyConfig,
            prefs,
            is_opener,
        }
    }

    /// Builds an `openConfig` message with no prefs.
    pub fn open() -> Self {
        Self {
            kind: ConfigMessageKind::OpenConfig,
            prefs: Map::new(),
            is_opener: false,
        }
    }

    /// Serializes the message to the JSON text posted between frames.
    ///
    /// # Errors
    ///
    /// Returns an error when a pref value cannot be serialized.
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| e.to_string())
    }
}

/// Geographic details attached to a [`Device`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceLocation {
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State or province.
    pub state: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// Latitude in degrees.
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    pub longitude: Option<f64>,
}

/// Player device description returned by `getDevice()`.
///
/// Every field is optional because hosts differ in what they report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Device {
    /// Display name.
    pub name: Option<String>,
    /// Registration key identifying the device.
    pub registration_key: Option<String>,
    /// Device/player type label.
    pub device_type: Option<String>,
    /// ISO-8601 date the device entered service.
    pub entered_service: Option<String>,
    /// Language code.
    #[serde(rename = "langCode")]
    pub language_code: Option<String>,
    /// Time zone identifier.
    pub time_zone: Option<String>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Location details.
    pub location: Option<DeviceLocation>,
}
