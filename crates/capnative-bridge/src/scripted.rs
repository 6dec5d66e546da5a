// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory bridge that answers native calls from registered handlers.
//
// Used by the test suites and by demos that need a "native" side without a
// device. It records every call it receives and keeps the result sinks of
// keep-alive calls so later events can be pushed through them.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use capnative_core::error::Result;
use capnative_core::types::{CallbackId, PluginError, PluginResult};
use tracing::debug;

use crate::traits::{CallbackDispatch, NativeBridge, NativeCall, PromiseDispatch, ResultSink};

/// Which dispatch primitives the scripted bridge exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedMode {
    Callback,
    Promise,
    Both,
}

type Handler = Box<dyn Fn(&NativeCall) -> PluginResult + Send + Sync>;

/// A native side driven by closures.
pub struct ScriptedBridge {
    platform: String,
    native: AtomicBool,
    mode: ScriptedMode,
    handlers: Mutex<HashMap<(String, String), Handler>>,
    calls: Mutex<Vec<NativeCall>>,
    live: Mutex<HashMap<CallbackId, ResultSink>>,
    released: Mutex<Vec<CallbackId>>,
}

impl ScriptedBridge {
    /// A native bridge exposing both primitives.
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            native: AtomicBool::new(true),
            mode: ScriptedMode::Both,
            handlers: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            live: Mutex::new(HashMap::new()),
            released: Mutex::new(Vec::new()),
        }
    }

    pub fn with_mode(mut self, mode: ScriptedMode) -> Self {
        self.mode = mode;
        self
    }

    /// Flip the "running in a native shell" predicate.
    pub fn set_native(&self, native: bool) {
        self.native.store(native, Ordering::Release);
    }

    /// Answer calls to `plugin.method` with `handler`.
    pub fn on(
        &self,
        plugin: &str,
        method: &str,
        handler: impl Fn(&NativeCall) -> PluginResult + Send + Sync + 'static,
    ) {
        self.handlers
            .lock()
            .expect("handlers lock poisoned")
            .insert((plugin.to_owned(), method.to_owned()), Box::new(handler));
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<NativeCall> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    /// Push another result through a keep-alive call.
    ///
    /// Returns `false` if the call is unknown, released, or already failed.
    pub fn emit(&self, id: &CallbackId, result: PluginResult) -> bool {
        let sink = self.live.lock().expect("live lock poisoned").get(id).cloned();
        match sink {
            Some(sink) => sink.settle(result),
            None => false,
        }
    }

    /// Ids of keep-alive calls the caller has not released.
    pub fn live_callbacks(&self) -> Vec<CallbackId> {
        self.live
            .lock()
            .expect("live lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Ids passed to `CallbackDispatch::release`, oldest first.
    pub fn released(&self) -> Vec<CallbackId> {
        self.released.lock().expect("released lock poisoned").clone()
    }

    fn respond(&self, call: &NativeCall) -> PluginResult {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(call.clone());

        let handlers = self.handlers.lock().expect("handlers lock poisoned");
        match handlers.get(&(call.plugin_name.clone(), call.method_name.clone())) {
            Some(handler) => handler(call),
            None => Err(PluginError::new(format!(
                "{}.{} is not implemented",
                call.plugin_name, call.method_name
            ))
            .with_code("UNIMPLEMENTED")),
        }
    }
}

impl NativeBridge for ScriptedBridge {
    fn platform_name(&self) -> &str {
        &self.platform
    }

    fn is_native_platform(&self) -> bool {
        self.native.load(Ordering::Acquire)
    }

    fn callback_dispatch(&self) -> Option<&dyn CallbackDispatch> {
        match self.mode {
            ScriptedMode::Callback | ScriptedMode::Both => Some(self),
            ScriptedMode::Promise => None,
        }
    }

    fn promise_dispatch(&self) -> Option<&dyn PromiseDispatch> {
        match self.mode {
            ScriptedMode::Promise | ScriptedMode::Both => Some(self),
            ScriptedMode::Callback => None,
        }
    }
}

impl CallbackDispatch for ScriptedBridge {
    fn dispatch(&self, call: NativeCall, sink: ResultSink) -> Result<()> {
        debug!(plugin = %call.plugin_name, method = %call.method_name, "scripted callback dispatch");
        let result = self.respond(&call);
        if let Some(id) = &call.callback_id {
            self.live
                .lock()
                .expect("live lock poisoned")
                .insert(id.clone(), sink.clone());
        }
        sink.settle(result);
        Ok(())
    }

    fn release(&self, callback_id: &CallbackId) {
        self.live
            .lock()
            .expect("live lock poisoned")
            .remove(callback_id);
        self.released
            .lock()
            .expect("released lock poisoned")
            .push(callback_id.clone());
    }
}

#[async_trait]
impl PromiseDispatch for ScriptedBridge {
    async fn dispatch_async(&self, call: NativeCall) -> PluginResult {
        debug!(plugin = %call.plugin_name, method = %call.method_name, "scripted promise dispatch");
        self.respond(&call)
    }
}
