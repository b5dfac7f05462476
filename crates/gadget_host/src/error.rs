//! Error type surfaced by host command/telemetry calls.

use thiserror::Error;

/// Result alias used by every [`crate::GadgetClient`] method.
pub type ClientResult<T> = Result<T, ClientError>;

/// Failure reported by the live player host.
///
/// Host absence is never an error; it selects the fallback client instead. These variants only
/// describe a host that is present but whose own method failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The host method threw synchronously or its returned promise rejected.
    #[error("host method `{method}` failed: {message}")]
    HostCall {
        /// Host method name as exposed on the player global.
        method: String,
        /// Rendered rejection value.
        message: String,
    },
    /// The host object does not expose the requested method.
    #[error("host method `{0}` is not available")]
    MissingMethod(String),
    /// An argument could not be encoded for the host.
    #[error("argument for host method `{method}` could not be encoded: {message}")]
    Encode {
        /// Host method name as exposed on the player global.
        method: String,
        /// Encoder error text.
        message: String,
    },
    /// The host returned a value that could not be decoded into the expected shape.
    #[error("host method `{method}` returned an undecodable value: {message}")]
    Decode {
        /// Host method name as exposed on the player global.
        method: String,
        /// Decoder error text.
        message: String,
    },
}

impl ClientError {
    /// Builds a [`ClientError::HostCall`] for `method`.
    pub fn host_call(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HostCall {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Returns the host method name the error refers to.
    pub fn method(&self) -> &str {
        match self {
            Self::HostCall { method, .. }
            | Self::Encode { method, .. }
            | Self::Decode { method, .. } => method,
            Self::MissingMethod(method) => method,
        }
    }
}
