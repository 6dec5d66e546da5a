// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Argument marshalling: one classified call shape in, one options map out.

use capnative_core::types::CallOptions;
use serde_json::Value;

use crate::args::{CallShape, PluginCallback};
use crate::signature::MethodSignature;

/// Options map plus the callback the caller supplied, if any.
pub struct Marshalled {
    pub options: CallOptions,
    pub callback: Option<PluginCallback>,
}

/// Turn a call shape into the options map sent to the native side.
///
/// - A structured options object passes through untouched.
/// - Positional values are zipped against the declared names: extra values
///   are dropped, missing ones become `null`.
/// - A bare callback yields an empty map.
pub fn marshal(shape: CallShape, signature: &MethodSignature) -> Marshalled {
    match shape {
        CallShape::StructuredOptions(options) => Marshalled {
            options,
            callback: None,
        },
        CallShape::OptionsPlusCallback(options, callback) => Marshalled {
            options,
            callback: Some(callback),
        },
        CallShape::CallbackOnly(callback) => Marshalled {
            options: CallOptions::new(),
            callback: Some(callback),
        },
        CallShape::PositionalArgs(values) => Marshalled {
            options: zip_positional(values, signature),
            callback: None,
        },
    }
}

fn zip_positional(values: Vec<Value>, signature: &MethodSignature) -> CallOptions {
    let mut values = values.into_iter();
    signature
        .params()
        .iter()
        .map(|name| (name.clone(), values.next().unwrap_or(Value::Null)))
        .collect()
}
