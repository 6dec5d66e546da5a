// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for capnative.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::PluginError;

/// Top-level error type for all capnative operations.
#[derive(Debug, Error)]
pub enum NativeError {
    // -- Decoration --
    #[error("configuration error: {0}")]
    Configuration(String),

    // -- Call time --
    #[error("native call failed: {0}")]
    Dispatch(PluginError),

    #[error("invalid call arguments: {0}")]
    InvalidArguments(String),

    #[error("no native dispatch primitive is available in this environment")]
    PlatformUnavailable,

    #[error("platform bridge error: {0}")]
    Bridge(String),

    // -- Generator --
    #[error("Couldn't find the ios plugin - did you run `capacitor add ios`? (looked in {})", .0.display())]
    MissingNativeProject(PathBuf),

    #[error("Couldn't find the web plugin, run build first (looked for {})", .0.display())]
    MissingBuildArtifact(PathBuf),

    #[error("The plugin name could not be found in {}", .0.display())]
    PluginNameNotFound(PathBuf),

    #[error("package.json has no usable `{0}` field")]
    MissingPackageField(String),

    // -- I/O and serialization --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NativeError {
    /// Shorthand for a decoration-time configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// The bridge failure payload, if this error came from a native call.
    pub fn plugin_error(&self) -> Option<&PluginError> {
        match self {
            Self::Dispatch(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PluginError> for NativeError {
    fn from(err: PluginError) -> Self {
        Self::Dispatch(err)
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NativeError>;
