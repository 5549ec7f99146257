//! Command envelope and reply shapes.
//!
//! Every remote operation travels through the same envelope. The payload and
//! the reply data are opaque JSON text on the wire; this module owns the
//! conversion between that text and [`serde_json::Value`].

use crate::CommandKey;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outgoing command: which operation to run and its serialized parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEnvelope {
    pub subsystem: String,
    pub action: String,
    /// Always valid JSON text. Absent parameters encode as `{}`.
    pub payload: String,
}

impl CommandEnvelope {
    /// Build an envelope, serializing `params` (or an empty object).
    pub fn new(
        subsystem: impl Into<String>,
        action: impl Into<String>,
        params: Option<&Value>,
    ) -> Result<Self, serde_json::Error> {
        let payload = match params {
            Some(value) => serde_json::to_string(value)?,
            None => serde_json::to_string(&Value::Object(Map::new()))?,
        };
        Ok(Self {
            subsystem: subsystem.into(),
            action: action.into(),
            payload,
        })
    }

    /// Build an envelope addressed by a [`CommandKey`].
    pub fn for_key(key: &CommandKey, params: Option<&Value>) -> Result<Self, serde_json::Error> {
        Self::new(key.subsystem(), key.action(), params)
    }

    /// Decode the payload back into a structured value.
    pub fn params(&self) -> Result<Value, DecodeError> {
        serde_json::from_str(&self.payload).map_err(|source| DecodeError::new("payload", source))
    }
}

/// Decoded reply to a dispatched command.
///
/// Serialized as-is to HTTP callers: the gateway passes it through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

/// Decoded reply to a health probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResult {
    pub healthy: bool,
    pub modules: Vec<ModuleHealth>,
    pub timestamp: String,
}

/// Health of one remote module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleHealth {
    pub name: String,
    pub up: bool,
    pub details: Option<Value>,
    /// Set when the module reported details that were not valid JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details_error: Option<String>,
}

impl ModuleHealth {
    /// Build from raw wire fields, decoding `details` on its own.
    pub fn decode(name: impl Into<String>, up: bool, details: &str) -> Self {
        let name = name.into();
        match decode_structured("details", details) {
            Ok(details) => Self {
                name,
                up,
                details,
                details_error: None,
            },
            Err(err) => Self {
                name,
                up,
                details: None,
                details_error: Some(err.to_string()),
            },
        }
    }

    pub fn details_failed(&self) -> bool {
        self.details_error.is_some()
    }
}

/// Opaque text on the wire that was not valid JSON.
#[derive(Debug, thiserror::Error)]
#[error("malformed {field}: {source}")]
pub struct DecodeError {
    pub field: &'static str,
    #[source]
    pub source: serde_json::Error,
}

impl DecodeError {
    pub fn new(field: &'static str, source: serde_json::Error) -> Self {
        Self { field, source }
    }
}

/// Decode an opaque wire field.
///
/// Empty text is absent (`Ok(None)`); anything else must parse as JSON.
pub fn decode_structured(field: &'static str, text: &str) -> Result<Option<Value>, DecodeError> {
    if text.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text)
        .map(Some)
        .map_err(|source| DecodeError::new(field, source))
}

/// Treat an empty wire string as absent.
pub fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}
