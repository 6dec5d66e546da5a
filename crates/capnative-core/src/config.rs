// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plugin and build-tool configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::PluginReturnType;

/// Stored configuration of a web plugin class.
///
/// The registered plugin name may be read from here instead of from a
/// `registered_plugin_name()` accessor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebPluginConfig {
    /// Name the plugin is registered under with the native bridge.
    pub name: Option<String>,
    /// Platforms the web implementation serves (informational).
    #[serde(default)]
    pub platforms: Vec<String>,
}

impl WebPluginConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            platforms: vec!["web".into()],
        }
    }
}

/// Settings for the iOS registration-file generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Directory of the native iOS plugin project (must already exist).
    pub ios_plugin_dir: PathBuf,
    /// Compiled web plugin bundle to scan.
    pub plugin_artifact: PathBuf,
    /// File name written inside `ios_plugin_dir`.
    pub output_file: String,
    /// Return type used for every generated method entry.
    pub method_return_type: PluginReturnType,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            ios_plugin_dir: PathBuf::from("ios").join("Plugin"),
            plugin_artifact: PathBuf::from("dist").join("plugin.js"),
            output_file: "Plugin.m".into(),
            method_return_type: PluginReturnType::Promise,
        }
    }
}

impl GeneratorConfig {
    /// Load a JSON config file; missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Full path of the generated registration file.
    pub fn output_path(&self) -> PathBuf {
        self.ios_plugin_dir.join(&self.output_file)
    }
}

/// Settings for the package-metadata exporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageMetaConfig {
    pub package_json: PathBuf,
    pub output: PathBuf,
    /// `package.json` keys copied into the generated module, in order.
    pub keys: Vec<String>,
}

impl Default for PackageMetaConfig {
    fn default() -> Self {
        Self {
            package_json: PathBuf::from("package.json"),
            output: PathBuf::from("src").join("pkg.ts"),
            keys: vec!["name".into(), "version".into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_defaults_match_capacitor_layout() {
        let config = GeneratorConfig::default();
        assert_eq!(config.output_path(), Path::new("ios/Plugin/Plugin.m"));
        assert_eq!(config.plugin_artifact, Path::new("dist/plugin.js"));
    }

    #[test]
    fn partial_config_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("capnative.json");
        std::fs::write(&path, r#"{ "plugin_artifact": "build/index.js" }"#).expect("write");

        let config = GeneratorConfig::load(&path).expect("load");
        assert_eq!(config.plugin_artifact, Path::new("build/index.js"));
        assert_eq!(config.output_file, "Plugin.m");
        assert_eq!(config.method_return_type, PluginReturnType::Promise);
    }

    #[test]
    fn malformed_config_is_a_serialization_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("capnative.json");
        std::fs::write(&path, "{ not json").expect("write");

        let err = GeneratorConfig::load(&path).expect_err("should fail");
        assert!(matches!(err, crate::NativeError::Serialization(_)));
    }
}
