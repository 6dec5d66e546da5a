// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Registry of natively dispatched methods, per plugin.
//
// Filled while native methods are built and read by the build-time
// generator to know which methods need native registration entries. The
// runtime dispatch path never reads it.

use std::collections::BTreeMap;

use capnative_core::types::PluginReturnType;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Plugin name -> method name -> return type. Set semantics per plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeMethodRegistry {
    plugins: BTreeMap<String, BTreeMap<String, PluginReturnType>>,
}

impl NativeMethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a native method. Returns `false` if it was already recorded.
    ///
    /// Re-recording keeps the first return type.
    pub fn record(&mut self, plugin: &str, method: &str, return_type: PluginReturnType) -> bool {
        let methods = self.plugins.entry(plugin.to_owned()).or_default();
        if methods.contains_key(method) {
            return false;
        }
        debug!(plugin, method, ?return_type, "native method registered");
        methods.insert(method.to_owned(), return_type);
        true
    }

    pub fn contains(&self, plugin: &str, method: &str) -> bool {
        self.plugins
            .get(plugin)
            .is_some_and(|methods| methods.contains_key(method))
    }

    /// Native methods of `plugin`, sorted by name.
    pub fn methods(&self, plugin: &str) -> impl Iterator<Item = (&str, PluginReturnType)> {
        self.plugins
            .get(plugin)
            .into_iter()
            .flat_map(|methods| methods.iter().map(|(name, rt)| (name.as_str(), *rt)))
    }

    pub fn plugins(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    /// Total number of recorded methods across plugins.
    pub fn len(&self) -> usize {
        self.plugins.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_twice_does_not_duplicate() {
        let mut registry = NativeMethodRegistry::new();
        assert!(registry.record("Foo", "bar", PluginReturnType::Promise));
        assert!(!registry.record("Foo", "bar", PluginReturnType::Callback));
        assert_eq!(registry.len(), 1);

        let methods: Vec<_> = registry.methods("Foo").collect();
        assert_eq!(methods, [("bar", PluginReturnType::Promise)]);
    }

    #[test]
    fn plugins_are_kept_apart() {
        let mut registry = NativeMethodRegistry::new();
        registry.record("Foo", "open", PluginReturnType::Promise);
        registry.record("Bar", "open", PluginReturnType::Promise);
        registry.record("Foo", "close", PluginReturnType::None);

        assert_eq!(registry.plugins().collect::<Vec<_>>(), ["Bar", "Foo"]);
        assert!(registry.contains("Bar", "open"));
        assert!(!registry.contains("Bar", "close"));
        assert_eq!(
            registry.methods("Foo").map(|(m, _)| m).collect::<Vec<_>>(),
            ["close", "open"]
        );
        assert_eq!(registry.methods("Nope").count(), 0);
    }

    #[test]
    fn serializes_for_build_tooling() {
        let mut registry = NativeMethodRegistry::new();
        registry.record("Foo", "bar", PluginReturnType::Callback);
        let json = serde_json::to_value(&registry).expect("serialize");
        assert_eq!(json, serde_json::json!({ "plugins": { "Foo": { "bar": "callback" } } }));
    }
}
