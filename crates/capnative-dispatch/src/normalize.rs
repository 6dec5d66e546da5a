// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Result normalization: turn the bridge's raw outcome into what the caller
// sees, honouring custom resolvers from a native adapter.

use capnative_core::types::{PluginResult, PluginResultData};
use serde_json::Value;

use crate::adapter::ResultHandlers;
use crate::settle::{Rejecter, Resolver, Settlement};

/// Default success rule.
///
/// A payload with exactly one key resolves to that key's bare value. Absent
/// or empty payloads resolve to `null`. Anything else resolves unchanged.
pub fn normalize_success(data: PluginResultData) -> Value {
    match data {
        Some(map) if map.len() == 1 => map.into_iter().next().map_or(Value::Null, |(_, v)| v),
        Some(map) if map.is_empty() => Value::Null,
        Some(map) => Value::Object(map),
        None => Value::Null,
    }
}

/// Route one raw bridge outcome to the custom resolvers or the defaults.
pub(crate) fn settle(result: PluginResult, handlers: &ResultHandlers, target: Settlement) {
    match result {
        Ok(data) => {
            let resolver = Resolver::new(target);
            match &handlers.resolve {
                Some(resolve) => resolve(data, resolver),
                None => {
                    resolver.resolve(normalize_success(data));
                }
            }
        }
        Err(error) => {
            let rejecter = Rejecter::new(target);
            match &handlers.reject {
                Some(reject) => reject(error, rejecter),
                None => {
                    rejecter.reject(error);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capnative_core::types::PluginError;
    use serde_json::json;
    use std::sync::Arc;

    fn map(value: Value) -> PluginResultData {
        value.as_object().cloned()
    }

    #[test]
    fn single_key_is_unwrapped() {
        assert_eq!(normalize_success(map(json!({ "value": 42 }))), json!(42));
    }

    #[test]
    fn several_keys_are_kept() {
        let payload = json!({ "a": 1, "b": 2 });
        assert_eq!(normalize_success(map(payload.clone())), payload);
    }

    #[test]
    fn empty_and_absent_are_null() {
        assert_eq!(normalize_success(map(json!({}))), Value::Null);
        assert_eq!(normalize_success(None), Value::Null);
    }

    #[test]
    fn single_key_holding_an_object_unwraps_one_level() {
        let payload = json!({ "photo": { "path": "/a.jpg", "size": 3 } });
        assert_eq!(
            normalize_success(map(payload)),
            json!({ "path": "/a.jpg", "size": 3 })
        );
    }

    #[test]
    fn failure_without_resolver_rejects_with_payload() {
        let (target, mut rx) = Settlement::once();
        let error = PluginError::new("x").with_code("E1");
        settle(Err(error.clone()), &ResultHandlers::default(), target);
        assert_eq!(rx.try_recv().expect("settled"), Err(error));
    }

    #[test]
    fn custom_resolver_sees_raw_payload() {
        let (target, mut rx) = Settlement::once();
        let handlers = ResultHandlers {
            resolve: Some(Arc::new(|data: PluginResultData, resolver: Resolver| {
                let keys = data.map_or(0, |m| m.len());
                resolver.resolve(json!({ "keys": keys }));
            })),
            reject: None,
        };
        settle(Ok(map(json!({ "only": true }))), &handlers, target);
        assert_eq!(rx.try_recv().expect("settled"), Ok(json!({ "keys": 1 })));
    }

    #[test]
    fn custom_rejecter_may_recover() {
        let (target, mut rx) = Settlement::once();
        let handlers = ResultHandlers {
            resolve: None,
            reject: Some(Arc::new(|error: PluginError, rejecter: Rejecter| {
                if error.code.as_deref() == Some("NOT_FOUND") {
                    rejecter.resolve(Value::Null);
                } else {
                    rejecter.reject(error);
                }
            })),
        };
        settle(
            Err(PluginError::new("missing").with_code("NOT_FOUND")),
            &handlers,
            target,
        );
        assert_eq!(rx.try_recv().expect("settled"), Ok(Value::Null));
    }
}
