// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Call arguments and call-shape classification.
//
// A plugin method receives a heterogeneous argument list: JSON values and,
// for callback-style methods, a callback. Before marshalling, the list is
// classified into exactly one `CallShape`.

use std::sync::Arc;

use capnative_core::error::{NativeError, Result};
use capnative_core::types::{CallOptions, PluginError};
use serde_json::Value;

/// Caller-supplied callback of a callback-style method.
///
/// Receives every normalized success, then at most one failure.
pub type PluginCallback = Arc<dyn Fn(std::result::Result<Value, PluginError>) + Send + Sync>;

/// One received argument.
#[derive(Clone)]
pub enum CallArg {
    Value(Value),
    Callback(PluginCallback),
}

impl CallArg {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Callback(_) => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Callback(_) => None,
        }
    }

    pub fn is_callback(&self) -> bool {
        matches!(self, Self::Callback(_))
    }
}

impl std::fmt::Debug for CallArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// The argument list of one call, in received order.
#[derive(Debug, Clone, Default)]
pub struct CallArgs(Vec<CallArg>);

impl CallArgs {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// A single structured-options argument.
    pub fn options(options: CallOptions) -> Self {
        Self(vec![CallArg::Value(Value::Object(options))])
    }

    /// Append a value argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.0.push(CallArg::Value(value.into()));
        self
    }

    /// Append a callback argument.
    pub fn callback(
        mut self,
        callback: impl Fn(std::result::Result<Value, PluginError>) + Send + Sync + 'static,
    ) -> Self {
        self.0.push(CallArg::Callback(Arc::new(callback)));
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CallArg> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CallArg> {
        self.0.iter()
    }
}

impl From<Vec<Value>> for CallArgs {
    fn from(values: Vec<Value>) -> Self {
        Self(values.into_iter().map(CallArg::Value).collect())
    }
}

impl FromIterator<CallArg> for CallArgs {
    fn from_iter<I: IntoIterator<Item = CallArg>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for CallArgs {
    type Item = CallArg;
    type IntoIter = std::vec::IntoIter<CallArg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The shape a call's arguments take.
#[derive(Clone)]
pub enum CallShape {
    /// Exactly one plain object: used as the options map as-is.
    StructuredOptions(CallOptions),
    /// Plain values, zipped against the declared parameter names.
    PositionalArgs(Vec<Value>),
    /// An options object followed by a callback.
    OptionsPlusCallback(CallOptions, PluginCallback),
    /// A callback alone.
    CallbackOnly(PluginCallback),
}

impl CallShape {
    /// Classify an argument list.
    ///
    /// Callbacks are only accepted as the sole argument or right after an
    /// options object; anywhere else the call is rejected.
    pub fn classify(args: CallArgs) -> Result<Self> {
        let mut args = args.0;
        let shaped = match args.as_mut_slice() {
            [CallArg::Value(Value::Object(options))] => {
                Some(Self::StructuredOptions(std::mem::take(options)))
            }
            [CallArg::Callback(cb)] => Some(Self::CallbackOnly(Arc::clone(cb))),
            [CallArg::Value(Value::Object(options)), CallArg::Callback(cb)] => Some(
                Self::OptionsPlusCallback(std::mem::take(options), Arc::clone(cb)),
            ),
            _ => None,
        };
        if let Some(shape) = shaped {
            return Ok(shape);
        }

        if let Some(position) = args.iter().position(CallArg::is_callback) {
            return Err(NativeError::InvalidArguments(format!(
                "unexpected callback at argument {position}: callbacks go first or right after an options object"
            )));
        }
        let values = args.into_iter().filter_map(|arg| arg.into_value()).collect();
        Ok(Self::PositionalArgs(values))
    }

    pub fn callback(&self) -> Option<&PluginCallback> {
        match self {
            Self::OptionsPlusCallback(_, cb) | Self::CallbackOnly(cb) => Some(cb),
            Self::StructuredOptions(_) | Self::PositionalArgs(_) => None,
        }
    }

    /// Short tag for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StructuredOptions(_) => "structured-options",
            Self::PositionalArgs(_) => "positional",
            Self::OptionsPlusCallback(..) => "options-plus-callback",
            Self::CallbackOnly(_) => "callback-only",
        }
    }
}

impl std::fmt::Debug for CallShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StructuredOptions(options) => {
                f.debug_tuple("StructuredOptions").field(options).finish()
            }
            Self::PositionalArgs(values) => f.debug_tuple("PositionalArgs").field(values).finish(),
            Self::OptionsPlusCallback(options, _) => f
                .debug_tuple("OptionsPlusCallback")
                .field(options)
                .field(&"..")
                .finish(),
            Self::CallbackOnly(_) => f.write_str("CallbackOnly(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> CallOptions {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn single_object_is_structured_options() {
        let shape = CallShape::classify(CallArgs::new().arg(json!({ "a": 1 }))).expect("classify");
        match shape {
            CallShape::StructuredOptions(options) => assert_eq!(options, object(json!({ "a": 1 }))),
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn single_array_or_null_is_positional() {
        let array = CallShape::classify(CallArgs::new().arg(json!([1, 2]))).expect("classify");
        assert_eq!(array.kind(), "positional");

        let null = CallShape::classify(CallArgs::new().arg(Value::Null)).expect("classify");
        assert_eq!(null.kind(), "positional");
    }

    #[test]
    fn two_objects_are_positional() {
        let args = CallArgs::new().arg(json!({})).arg(json!({}));
        let shape = CallShape::classify(args).expect("classify");
        match shape {
            CallShape::PositionalArgs(values) => assert_eq!(values.len(), 2),
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn options_then_callback() {
        let args = CallArgs::new().arg(json!({ "id": "x" })).callback(|_| {});
        let shape = CallShape::classify(args).expect("classify");
        assert_eq!(shape.kind(), "options-plus-callback");
        assert!(shape.callback().is_some());
    }

    #[test]
    fn bare_callback() {
        let shape = CallShape::classify(CallArgs::new().callback(|_| {})).expect("classify");
        assert_eq!(shape.kind(), "callback-only");
    }

    #[test]
    fn empty_list_is_positional() {
        let shape = CallShape::classify(CallArgs::new()).expect("classify");
        match shape {
            CallShape::PositionalArgs(values) => assert!(values.is_empty()),
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn misplaced_callback_is_rejected() {
        let args = CallArgs::new().arg(1).callback(|_| {});
        let err = CallShape::classify(args).expect_err("should reject");
        assert!(matches!(err, NativeError::InvalidArguments(_)));

        let args = CallArgs::new().callback(|_| {}).arg(json!({}));
        assert!(CallShape::classify(args).is_err());
    }
}
