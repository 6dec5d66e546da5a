// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! capnative: the native call adapter.
//!
//! A [`NativeMethod`] wraps the web body of a plugin method. Every call checks
//! whether we run inside a native shell: if not, the web body runs with the
//! arguments untouched; if so, the arguments are marshalled into a single
//! options map, optionally rewritten by a [`NativeAdapter`], dispatched
//! through the installed bridge, and the bridge's result is normalized into
//! what the caller expects.

pub mod adapter;
pub mod args;
pub mod marshal;
pub mod method;
pub mod normalize;
pub mod plugin;
pub mod registry;
pub mod settle;
pub mod signature;

pub use adapter::{AdapterOptions, NativeAdapter, NativeAdapterDetails};
pub use args::{CallArg, CallArgs, CallShape, PluginCallback};
pub use method::{NativeMethod, NativeMethodBuilder, WebMethod};
pub use normalize::normalize_success;
pub use plugin::DecoratedNativePlugin;
pub use registry::NativeMethodRegistry;
pub use settle::{CallOutcome, Rejecter, Resolver};
pub use signature::MethodSignature;
