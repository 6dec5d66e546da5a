// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plugin name accessor.

use capnative_core::config::WebPluginConfig;

/// A plugin whose methods may be dispatched natively.
///
/// The registered name addresses the plugin on the native bridge. It is read
/// on every dispatch; `None` (or an empty name) means the plugin cannot be
/// addressed: native methods refuse to build, and a name lost after that
/// fails the call with a bridge error.
pub trait DecoratedNativePlugin: Send + Sync {
    fn registered_plugin_name(&self) -> Option<&str>;
}

impl DecoratedNativePlugin for WebPluginConfig {
    fn registered_plugin_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Usable name, if the accessor yields one.
pub(crate) fn plugin_name(plugin: &dyn DecoratedNativePlugin) -> Option<&str> {
    plugin
        .registered_plugin_name()
        .map(str::trim)
        .filter(|name| !name.is_empty())
}
