// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for native plugin calls.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// The options passed to a native plugin method.
///
/// Insertion-ordered (`serde_json` is built with `preserve_order`), keys are
/// unique, values are opaque to the adapter.
pub type CallOptions = Map<String, Value>;

/// Success payload of a native call. `None` is the bridge's `null`.
pub type PluginResultData = Option<Map<String, Value>>;

/// Outcome of one native dispatch as produced by the bridge.
pub type PluginResult = std::result::Result<PluginResultData, PluginError>;

/// Failure payload returned by a native plugin.
///
/// Always carries a human-readable message; plugins may also return a
/// machine-readable code and extra data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

impl PluginError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            data: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }
}

impl std::fmt::Display for PluginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for PluginError {}

/// How a native method reports its result back to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginReturnType {
    /// Fire the call; the caller only learns whether it was accepted.
    None,
    /// Settle once with the normalized result.
    #[default]
    Promise,
    /// Keep-alive: the native side may report successes repeatedly.
    Callback,
}

impl PluginReturnType {
    /// The Capacitor iOS constant used when registering a method of this type.
    pub fn ios_constant(self) -> &'static str {
        match self {
            Self::None => "CAPPluginReturnNone",
            Self::Promise => "CAPPluginReturnPromise",
            Self::Callback => "CAPPluginReturnCallback",
        }
    }
}

/// Identifier of a keep-alive native call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallbackId(pub String);

impl CallbackId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CallbackId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CallbackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CallbackId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plugin_error_deserializes_without_code() {
        let err: PluginError =
            serde_json::from_value(json!({ "message": "denied" })).expect("parse");
        assert_eq!(err.message, "denied");
        assert!(err.code.is_none());
        assert_eq!(err.to_string(), "denied");
    }

    #[test]
    fn plugin_error_display_includes_code() {
        let err = PluginError::new("x").with_code("E1");
        assert_eq!(err.to_string(), "x (E1)");
        let back = serde_json::to_value(&err).expect("serialize");
        assert_eq!(back, json!({ "message": "x", "code": "E1" }));
    }

    #[test]
    fn return_type_defaults_to_promise() {
        assert_eq!(PluginReturnType::default(), PluginReturnType::Promise);
        let parsed: PluginReturnType = serde_json::from_str("\"callback\"").expect("parse");
        assert_eq!(parsed.ios_constant(), "CAPPluginReturnCallback");
    }

    #[test]
    fn callback_ids_are_unique() {
        assert_ne!(CallbackId::new(), CallbackId::new());
    }
}
