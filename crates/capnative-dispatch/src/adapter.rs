// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native adapters: per-method overrides of the options sent to the bridge and
// of how its results settle the call.

use std::sync::Arc;

use capnative_core::types::{CallOptions, PluginError, PluginResultData};

use crate::settle::{Rejecter, Resolver};

/// Custom success handling. Must call the `Resolver` to settle the call.
pub type SuccessResolver = Arc<dyn Fn(PluginResultData, Resolver) + Send + Sync>;

/// Custom failure handling. Must call the `Rejecter` to settle the call.
pub type FailureResolver = Arc<dyn Fn(PluginError, Rejecter) + Send + Sync>;

/// Rewrites the marshalled options.
pub type OptionsTransform = Arc<dyn Fn(CallOptions) -> CallOptions + Send + Sync>;

/// Options override carried by adapter details.
#[derive(Clone)]
pub enum AdapterOptions {
    /// Replace the marshalled options entirely.
    Static(CallOptions),
    /// Derive the final options from the marshalled ones.
    Transform(OptionsTransform),
}

impl AdapterOptions {
    fn apply(&self, marshalled: CallOptions) -> CallOptions {
        match self {
            Self::Static(options) => options.clone(),
            Self::Transform(transform) => transform(marshalled),
        }
    }
}

/// Overrides for one call: options, success resolution, failure resolution.
#[derive(Clone, Default)]
pub struct NativeAdapterDetails {
    pub options: Option<AdapterOptions>,
    pub resolve: Option<SuccessResolver>,
    pub reject: Option<FailureResolver>,
}

impl NativeAdapterDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = Some(AdapterOptions::Static(options));
        self
    }

    pub fn map_options(
        mut self,
        transform: impl Fn(CallOptions) -> CallOptions + Send + Sync + 'static,
    ) -> Self {
        self.options = Some(AdapterOptions::Transform(Arc::new(transform)));
        self
    }

    pub fn on_success(
        mut self,
        resolve: impl Fn(PluginResultData, Resolver) + Send + Sync + 'static,
    ) -> Self {
        self.resolve = Some(Arc::new(resolve));
        self
    }

    pub fn on_failure(
        mut self,
        reject: impl Fn(PluginError, Rejecter) + Send + Sync + 'static,
    ) -> Self {
        self.reject = Some(Arc::new(reject));
        self
    }
}

/// Adapter declared on a native method.
#[derive(Clone)]
pub enum NativeAdapter {
    /// Fixed details used as-is on every call.
    Static(NativeAdapterDetails),
    /// Details computed from each call's marshalled options.
    Dynamic(Arc<dyn Fn(&CallOptions) -> NativeAdapterDetails + Send + Sync>),
}

impl NativeAdapter {
    pub fn from_fn(
        f: impl Fn(&CallOptions) -> NativeAdapterDetails + Send + Sync + 'static,
    ) -> Self {
        Self::Dynamic(Arc::new(f))
    }

    fn details(&self, marshalled: &CallOptions) -> NativeAdapterDetails {
        match self {
            Self::Static(details) => details.clone(),
            Self::Dynamic(f) => f(marshalled),
        }
    }
}

impl From<NativeAdapterDetails> for NativeAdapter {
    fn from(details: NativeAdapterDetails) -> Self {
        Self::Static(details)
    }
}

/// Resolvers that settle a call; empty means the default rules.
#[derive(Clone, Default)]
pub(crate) struct ResultHandlers {
    pub(crate) resolve: Option<SuccessResolver>,
    pub(crate) reject: Option<FailureResolver>,
}

/// Final options plus the resolvers to settle with.
pub(crate) struct Negotiated {
    pub(crate) options: CallOptions,
    pub(crate) handlers: ResultHandlers,
}

/// Resolve the method's adapter (if any) against the marshalled options.
pub(crate) fn negotiate(adapter: Option<&NativeAdapter>, marshalled: CallOptions) -> Negotiated {
    let Some(adapter) = adapter else {
        return Negotiated {
            options: marshalled,
            handlers: ResultHandlers::default(),
        };
    };

    let details = adapter.details(&marshalled);
    let options = match &details.options {
        Some(options) => options.apply(marshalled),
        None => marshalled,
    };
    Negotiated {
        options,
        handlers: ResultHandlers {
            resolve: details.resolve,
            reject: details.reject,
        },
    }
}
