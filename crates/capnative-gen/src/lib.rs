// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// capnative: build-time tooling.
//
// Neither generator runs at call time. `ios` emits the Objective-C file that
// registers a plugin's native methods with Capacitor; `pkg_meta` exports a
// few package.json fields as a TypeScript constant module.

pub mod ios;
pub mod pkg_meta;

pub use ios::{PluginDescription, generate_ios_plugin, render_plugin_m, scan_plugin_source};
pub use pkg_meta::{export_package_meta, render_pkg_module};
