// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Package-metadata exporter.
//
// Copies a few package.json fields into a small TypeScript module so plugin
// code can report its own name and version without importing the whole
// package.json.

use std::path::PathBuf;

use capnative_core::config::PackageMetaConfig;
use capnative_core::error::{NativeError, Result};
use serde_json::Value;
use tracing::info;

/// Render `const pkg = { .. }\n\nexport default pkg\n` for `keys`.
pub fn render_pkg_module(package: &Value, keys: &[String]) -> Result<String> {
    let mut lines = Vec::with_capacity(keys.len());
    for key in keys {
        let value = match package.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => return Err(NativeError::MissingPackageField(key.clone())),
        };
        lines.push(format!("{key}: '{}'", escape_single_quoted(&value)));
    }
    Ok(format!(
        "const pkg = {{\n  {}\n}}\n\nexport default pkg\n",
        lines.join(",\n  ")
    ))
}

fn escape_single_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Read the configured package.json and write the module. Returns the path
/// written.
pub fn export_package_meta(config: &PackageMetaConfig) -> Result<PathBuf> {
    let raw = std::fs::read_to_string(&config.package_json)?;
    let package: Value = serde_json::from_str(&raw)?;
    let module = render_pkg_module(&package, &config.keys)?;

    if let Some(parent) = config.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&config.output, module)?;
    info!(path = %config.output.display(), keys = config.keys.len(), "package metadata exported");
    Ok(config.output.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn default_keys() -> Vec<String> {
        PackageMetaConfig::default().keys
    }

    #[test]
    fn renders_name_and_version() {
        let package = json!({
            "name": "@example/capacitor-echo",
            "version": "1.2.3",
            "dependencies": { "@capacitor/core": "^5" },
        });
        let module = render_pkg_module(&package, &default_keys()).expect("render");
        assert_eq!(
            module,
            "const pkg = {\n  name: '@example/capacitor-echo',\n  version: '1.2.3'\n}\n\nexport default pkg\n"
        );
    }

    #[test]
    fn missing_field_is_an_error() {
        let err = render_pkg_module(&json!({ "name": "x" }), &default_keys()).expect_err("no version");
        assert!(matches!(err, NativeError::MissingPackageField(ref key) if key == "version"));
    }

    #[test]
    fn quotes_are_escaped() {
        let module = render_pkg_module(&json!({ "name": "it's" }), &["name".to_owned()])
            .expect("render");
        assert!(module.contains(r"name: 'it\'s'"));
    }

    #[test]
    fn exports_to_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = PackageMetaConfig {
            package_json: dir.path().join("package.json"),
            output: dir.path().join("src").join("pkg.ts"),
            ..PackageMetaConfig::default()
        };
        std::fs::write(&config.package_json, r#"{ "name": "echo", "version": "0.1.0" }"#)
            .expect("write");

        let written = export_package_meta(&config).expect("export");
        let contents = std::fs::read_to_string(written).expect("read");
        assert!(contents.starts_with("const pkg = {\n  name: 'echo',"));
    }
}
