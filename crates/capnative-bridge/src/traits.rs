// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the native bridge.
//
// A bridge exposes the "are we native" predicate plus one or both dispatch
// primitives. Host shells differ in which primitive they offer, so both are
// optional capabilities looked up at call time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use capnative_core::error::Result;
use capnative_core::types::{CallOptions, CallbackId, PluginError, PluginResult, PluginResultData};

/// Process-wide bridge between script code and the native platform.
pub trait NativeBridge: Send + Sync {
    /// Human-readable platform name (e.g. "ios", "android", "web").
    fn platform_name(&self) -> &str;

    /// Whether execution currently happens inside a native shell.
    ///
    /// Callers re-evaluate this on every call; implementations must not
    /// assume it is cached.
    fn is_native_platform(&self) -> bool;

    /// The callback-passing dispatch primitive, if this bridge has one.
    fn callback_dispatch(&self) -> Option<&dyn CallbackDispatch> {
        None
    }

    /// The promise-returning dispatch primitive, if this bridge has one.
    fn promise_dispatch(&self) -> Option<&dyn PromiseDispatch> {
        None
    }
}

/// `dispatch(pluginName, methodName, options, {onSuccess, onFailure})`.
pub trait CallbackDispatch: Send + Sync {
    /// Hand a call to the native side. Results arrive through `sink`.
    ///
    /// Returns an error only if the call could not be handed over at all;
    /// native failures are reported through `ResultSink::failure`.
    fn dispatch(&self, call: NativeCall, sink: ResultSink) -> Result<()>;

    /// The caller is no longer interested in a keep-alive call.
    fn release(&self, _callback_id: &CallbackId) {}
}

/// `dispatchAsync(pluginName, methodName, options) -> Promise<ResultPayload>`.
#[async_trait]
pub trait PromiseDispatch: Send + Sync {
    async fn dispatch_async(&self, call: NativeCall) -> PluginResult;
}

/// One addressed native call.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeCall {
    pub plugin_name: String,
    pub method_name: String,
    pub options: CallOptions,
    /// Set for keep-alive calls; the native side may report success
    /// repeatedly under this id.
    pub callback_id: Option<CallbackId>,
}

impl NativeCall {
    pub fn new(
        plugin_name: impl Into<String>,
        method_name: impl Into<String>,
        options: CallOptions,
    ) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            method_name: method_name.into(),
            options,
            callback_id: None,
        }
    }

    /// Mark the call persistent under the given id.
    pub fn keep_alive(mut self, id: CallbackId) -> Self {
        self.callback_id = Some(id);
        self
    }

    pub fn is_keep_alive(&self) -> bool {
        self.callback_id.is_some()
    }
}

type ResultHandler = Arc<dyn Fn(PluginResult) + Send + Sync>;

/// The success/failure callback slots of a dispatched call.
///
/// Enforces the settlement contract regardless of how the native side
/// behaves: success and failure are mutually exclusive, failure fires at
/// most once, and a non keep-alive sink settles at most once. Reports
/// arriving after the sink closed are dropped.
#[derive(Clone)]
pub struct ResultSink {
    handler: ResultHandler,
    keep_alive: bool,
    closed: Arc<AtomicBool>,
}

impl ResultSink {
    pub fn new(keep_alive: bool, handler: impl Fn(PluginResult) + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
            keep_alive,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Report a success payload. Returns whether it was delivered.
    pub fn success(&self, data: PluginResultData) -> bool {
        let delivered = if self.keep_alive {
            !self.closed.load(Ordering::Acquire)
        } else {
            !self.closed.swap(true, Ordering::AcqRel)
        };
        if delivered {
            (self.handler)(Ok(data));
        } else {
            tracing::debug!("success reported on a closed result sink, dropped");
        }
        delivered
    }

    /// Report a failure payload and close the sink. Returns whether it was
    /// delivered.
    pub fn failure(&self, error: PluginError) -> bool {
        let delivered = !self.closed.swap(true, Ordering::AcqRel);
        if delivered {
            (self.handler)(Err(error));
        } else {
            tracing::debug!(error = %error, "failure reported on a closed result sink, dropped");
        }
        delivered
    }

    /// Report either outcome.
    pub fn settle(&self, result: PluginResult) -> bool {
        match result {
            Ok(data) => self.success(data),
            Err(error) => self.failure(error),
        }
    }

    /// Stop delivering. Returns `true` if the sink was still open.
    pub fn close(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for ResultSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultSink")
            .field("keep_alive", &self.keep_alive)
            .field("closed", &self.is_closed())
            .finish()
    }
}
