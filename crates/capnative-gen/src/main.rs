// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// capnative: build-time CLI.
//
// Entry point. Initialises logging, resolves configuration (defaults, then an
// optional JSON config file, then command-line flags), and runs one generator.

use std::path::PathBuf;
use std::process::ExitCode;

use capnative_core::config::{GeneratorConfig, PackageMetaConfig};
use capnative_core::error::Result;
use capnative_core::types::PluginReturnType;
use clap::{Parser, Subcommand};

/// Build-time tooling for capnative plugins.
#[derive(Parser, Debug)]
#[command(name = "capnative", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate ios/Plugin/Plugin.m from the compiled web plugin.
    IosPlugin {
        /// Compiled plugin bundle (default: dist/plugin.js).
        artifact: Option<PathBuf>,
        /// JSON file with generator settings.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Native iOS plugin directory (default: ios/Plugin).
        #[arg(long)]
        ios_dir: Option<PathBuf>,
        /// Return type for methods declared with a bare `native()`.
        #[arg(long, value_parser = parse_return_type)]
        return_type: Option<PluginReturnType>,
    },
    /// Export package.json name and version as src/pkg.ts.
    PkgMeta {
        #[arg(long)]
        package_json: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Fields to export, in order (default: name, version).
        #[arg(long, value_delimiter = ',')]
        keys: Vec<String>,
    },
}

fn parse_return_type(raw: &str) -> std::result::Result<PluginReturnType, String> {
    match raw {
        "none" => Ok(PluginReturnType::None),
        "promise" => Ok(PluginReturnType::Promise),
        "callback" => Ok(PluginReturnType::Callback),
        other => Err(format!("unknown return type `{other}` (expected none, promise or callback)")),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(path) => {
            println!("Created {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = ?e, "generator failed");
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}

fn run(command: Commands) -> Result<PathBuf> {
    match command {
        Commands::IosPlugin {
            artifact,
            config,
            ios_dir,
            return_type,
        } => {
            let mut settings = match config {
                Some(path) => GeneratorConfig::load(path)?,
                None => GeneratorConfig::default(),
            };
            if let Some(artifact) = artifact {
                settings.plugin_artifact = artifact;
            }
            if let Some(dir) = ios_dir {
                settings.ios_plugin_dir = dir;
            }
            if let Some(rt) = return_type {
                settings.method_return_type = rt;
            }
            capnative_gen::generate_ios_plugin(&settings)
        }
        Commands::PkgMeta {
            package_json,
            output,
            keys,
        } => {
            let mut settings = PackageMetaConfig::default();
            if let Some(path) = package_json {
                settings.package_json = path;
            }
            if let Some(path) = output {
                settings.output = path;
            }
            if !keys.is_empty() {
                settings.keys = keys;
            }
            capnative_gen::export_package_meta(&settings)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ios_plugin_takes_optional_artifact() {
        let cli = Cli::try_parse_from(["capnative", "ios-plugin", "build/plugin.js"]).expect("parse");
        match cli.command {
            Commands::IosPlugin { artifact, .. } => {
                assert_eq!(artifact, Some(PathBuf::from("build/plugin.js")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn pkg_meta_splits_keys() {
        let cli = Cli::try_parse_from(["capnative", "pkg-meta", "--keys", "name,version,description"])
            .expect("parse");
        match cli.command {
            Commands::PkgMeta { keys, .. } => assert_eq!(keys, ["name", "version", "description"]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn missing_project_is_reported_as_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = run(Commands::IosPlugin {
            artifact: Some(dir.path().join("plugin.js")),
            config: None,
            ios_dir: Some(dir.path().join("ios").join("Plugin")),
            return_type: None,
        });
        assert!(result.is_err());
    }
}
