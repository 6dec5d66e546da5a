// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// iOS registration-file generator.
//
// Scans the compiled web plugin bundle for the plugin class and the methods
// wrapped with `native(...)`, then writes `ios/Plugin/Plugin.m`:
//
//   #import <Foundation/Foundation.h>
//   #import <Capacitor/Capacitor.h>
//
//   CAP_PLUGIN(Foo, "Foo",
//     CAP_PLUGIN_METHOD(bar, CAPPluginReturnPromise);
//   )
//
// Every precondition is checked before anything is written.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use capnative_core::config::GeneratorConfig;
use capnative_core::error::{NativeError, Result};
use capnative_core::types::PluginReturnType;
use capnative_dispatch::NativeMethodRegistry;
use regex::Regex;
use tracing::{debug, info, instrument};

/// `class X extends WebPlugin { constructor() { super({ name: 'N'`
static PLUGIN_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"class\s+(\w+)\s+extends\s+(?:\w+\.)?WebPlugin\s*\{\s*constructor\s*\(\s*\)\s*\{\s*super\s*\(\s*\{\s*name\s*:\s*(?:'([^']+)'|"([^"]+)")"#,
    )
    .expect("plugin class pattern is valid")
});

/// `__decorate([ native(...) ], X.prototype, "method", null);`
static NATIVE_METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"__decorate\(\s*\[\s*(?:\w+\.)?native\(([^)]*)\)\s*,?\s*\]\s*,\s*(\w+)\.prototype\s*,\s*["']([^"']+)["']\s*,\s*null\s*\)"#,
    )
    .expect("native method pattern is valid")
});

const PLUGIN_M_HEADER: &str = "#import <Foundation/Foundation.h>\n#import <Capacitor/Capacitor.h>\n";

/// What the generator needs to know about one plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescription {
    pub plugin_name: String,
    /// Native methods in declaration order, without duplicates.
    pub methods: Vec<(String, PluginReturnType)>,
}

impl PluginDescription {
    /// Describe `plugin` from the methods recorded while building it.
    pub fn from_registry(registry: &NativeMethodRegistry, plugin: &str) -> Self {
        Self {
            plugin_name: plugin.to_owned(),
            methods: registry
                .methods(plugin)
                .map(|(name, rt)| (name.to_owned(), rt))
                .collect(),
        }
    }
}

/// Extract the plugin name and native methods from compiled plugin source.
///
/// Only decorations applied to the plugin class itself are collected. A
/// `native()` without arguments uses `default_return_type`.
pub fn scan_plugin_source(
    source: &str,
    source_path: &Path,
    default_return_type: PluginReturnType,
) -> Result<PluginDescription> {
    let class = PLUGIN_CLASS_RE
        .captures(source)
        .ok_or_else(|| NativeError::PluginNameNotFound(source_path.to_path_buf()))?;
    let class_name = &class[1];
    let plugin_name = class
        .get(2)
        .or_else(|| class.get(3))
        .map(|m| m.as_str().to_owned())
        .ok_or_else(|| NativeError::PluginNameNotFound(source_path.to_path_buf()))?;

    let mut methods: Vec<(String, PluginReturnType)> = Vec::new();
    for caps in NATIVE_METHOD_RE.captures_iter(source) {
        if &caps[2] != class_name {
            debug!(class = &caps[2], method = &caps[3], "skipping decoration on another class");
            continue;
        }
        let method = caps[3].to_owned();
        if methods.iter().any(|(name, _)| *name == method) {
            continue;
        }
        let return_type = parse_return_type(&caps[1]).unwrap_or(default_return_type);
        methods.push((method, return_type));
    }

    Ok(PluginDescription {
        plugin_name,
        methods,
    })
}

/// Read a `native(...)` argument: an enum member or its numeric value.
fn parse_return_type(arg: &str) -> Option<PluginReturnType> {
    let arg = arg.trim();
    let member = arg.rsplit('.').next().unwrap_or(arg).trim();
    match member {
        "none" | "0" => Some(PluginReturnType::None),
        "promise" | "1" => Some(PluginReturnType::Promise),
        "callback" | "2" => Some(PluginReturnType::Callback),
        _ => None,
    }
}

/// Render the Objective-C registration file.
pub fn render_plugin_m(plugin: &PluginDescription) -> String {
    let entries: Vec<String> = plugin
        .methods
        .iter()
        .map(|(method, rt)| format!("  CAP_PLUGIN_METHOD({method}, {});", rt.ios_constant()))
        .collect();
    format!(
        "{PLUGIN_M_HEADER}\nCAP_PLUGIN({name}, \"{name}\",\n{entries}\n)\n",
        name = plugin.plugin_name,
        entries = entries.join("\n"),
    )
}

/// Run the generator: check the project layout, scan the bundle, write the
/// registration file. Returns the path written.
#[instrument(skip_all, fields(artifact = %config.plugin_artifact.display()))]
pub fn generate_ios_plugin(config: &GeneratorConfig) -> Result<PathBuf> {
    if !config.ios_plugin_dir.is_dir() {
        return Err(NativeError::MissingNativeProject(config.ios_plugin_dir.clone()));
    }
    if !config.plugin_artifact.is_file() {
        return Err(NativeError::MissingBuildArtifact(config.plugin_artifact.clone()));
    }

    let source = std::fs::read_to_string(&config.plugin_artifact)?;
    let plugin = scan_plugin_source(&source, &config.plugin_artifact, config.method_return_type)?;
    debug!(
        plugin = %plugin.plugin_name,
        methods = plugin.methods.len(),
        "plugin scanned"
    );

    let output = config.output_path();
    write_whole(&output, &render_plugin_m(&plugin))?;
    info!(path = %output.display(), plugin = %plugin.plugin_name, "registration file written");
    Ok(output)
}

/// Write via a sibling temp file so a failed write never leaves a partial
/// output behind.
fn write_whole(path: &Path, contents: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, contents)?;
    if let Err(err) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(err.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOO_BUNDLE: &str = r#"
var capacitorFoo = (function (exports, core) {
    'use strict';

    class Foo extends WebPlugin { constructor(){ super({name: "Foo"}); } }
    __decorate([
        native()
    ], Foo.prototype, "bar", null);

    exports.Foo = Foo;
    return exports;
}({}, capacitorExports));
"#;

    fn project() -> (tempfile::TempDir, GeneratorConfig) {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = GeneratorConfig {
            ios_plugin_dir: dir.path().join("ios").join("Plugin"),
            plugin_artifact: dir.path().join("dist").join("plugin.js"),
            ..GeneratorConfig::default()
        };
        (dir, config)
    }

    fn write(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, contents).expect("write");
    }

    #[test]
    fn scans_plugin_name_and_native_method() {
        let plugin = scan_plugin_source(FOO_BUNDLE, Path::new("plugin.js"), PluginReturnType::Promise)
            .expect("scan");
        assert_eq!(plugin.plugin_name, "Foo");
        assert_eq!(plugin.methods, [("bar".to_owned(), PluginReturnType::Promise)]);
    }

    #[test]
    fn scans_rollup_output_with_core_prefix() {
        let source = r#"
class EchoWeb extends core.WebPlugin {
    constructor() {
        super({
            name: 'Echo',
            platforms: ['web'],
        });
    }
}
__decorate([
    native()
], EchoWeb.prototype, "echo", null);
__decorate([
    native(definitions.PluginReturnType.callback)
], EchoWeb.prototype, "watch", null);
__decorate([
    native()
], EchoWeb.prototype, "echo", null);
__decorate([
    native()
], Other.prototype, "ignored", null);
"#;
        let plugin = scan_plugin_source(source, Path::new("plugin.js"), PluginReturnType::Promise)
            .expect("scan");
        assert_eq!(plugin.plugin_name, "Echo");
        assert_eq!(
            plugin.methods,
            [
                ("echo".to_owned(), PluginReturnType::Promise),
                ("watch".to_owned(), PluginReturnType::Callback),
            ]
        );
    }

    #[test]
    fn renders_capacitor_macro_file() {
        let plugin = PluginDescription {
            plugin_name: "Foo".into(),
            methods: vec![
                ("bar".into(), PluginReturnType::Promise),
                ("watch".into(), PluginReturnType::Callback),
            ],
        };
        assert_eq!(
            render_plugin_m(&plugin),
            "#import <Foundation/Foundation.h>\n\
             #import <Capacitor/Capacitor.h>\n\
             \n\
             CAP_PLUGIN(Foo, \"Foo\",\n  \
             CAP_PLUGIN_METHOD(bar, CAPPluginReturnPromise);\n  \
             CAP_PLUGIN_METHOD(watch, CAPPluginReturnCallback);\n\
             )\n"
        );
    }

    #[test]
    fn describes_plugin_from_registry() {
        let mut registry = NativeMethodRegistry::new();
        registry.record("Foo", "bar", PluginReturnType::Promise);
        registry.record("Foo", "bar", PluginReturnType::Promise);
        let plugin = PluginDescription::from_registry(&registry, "Foo");
        assert!(render_plugin_m(&plugin).contains("CAP_PLUGIN_METHOD(bar, CAPPluginReturnPromise);"));
        assert_eq!(plugin.methods.len(), 1);
    }

    #[test]
    fn generates_registration_file() {
        let (_dir, config) = project();
        std::fs::create_dir_all(&config.ios_plugin_dir).expect("mkdir");
        write(&config.plugin_artifact, FOO_BUNDLE);

        let written = generate_ios_plugin(&config).expect("generate");
        assert_eq!(written, config.output_path());
        let contents = std::fs::read_to_string(&written).expect("read");
        assert!(contents.contains("CAP_PLUGIN(Foo, \"Foo\","));
        assert!(contents.contains("CAP_PLUGIN_METHOD(bar, CAPPluginReturnPromise);"));
    }

    #[test]
    fn missing_ios_project_fails_first() {
        let (_dir, config) = project();
        write(&config.plugin_artifact, FOO_BUNDLE);
        let err = generate_ios_plugin(&config).expect_err("should fail");
        assert!(matches!(err, NativeError::MissingNativeProject(_)));
        assert!(err.to_string().contains("capacitor add ios"));
    }

    #[test]
    fn missing_artifact_fails() {
        let (_dir, config) = project();
        std::fs::create_dir_all(&config.ios_plugin_dir).expect("mkdir");
        let err = generate_ios_plugin(&config).expect_err("should fail");
        assert!(matches!(err, NativeError::MissingBuildArtifact(_)));
        assert!(!config.output_path().exists());
    }

    #[test]
    fn unmatched_plugin_class_writes_nothing() {
        let (_dir, config) = project();
        std::fs::create_dir_all(&config.ios_plugin_dir).expect("mkdir");
        write(&config.plugin_artifact, "export const nothing = 1;\n");

        let err = generate_ios_plugin(&config).expect_err("should fail");
        assert!(matches!(err, NativeError::PluginNameNotFound(_)));
        assert!(!config.output_path().exists());
    }
}
