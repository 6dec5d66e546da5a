// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native methods: the wrapped call.
//
// `NativeMethod::builder` validates the method's configuration once (the
// "decoration" step) and produces a callable that, on every call:
//
//   1. asks the bridge whether we run inside a native shell,
//   2. if not, runs the web body with the arguments untouched,
//   3. if so, classifies and marshals the arguments, negotiates the adapter,
//      dispatches through whichever primitive the bridge offers, and settles
//      with the normalized result.
//
// Callback-style methods dispatch in keep-alive mode and return a callback
// id; `unsubscribe` ends such a call.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, Weak};

use async_trait::async_trait;
use capnative_bridge::{NativeBridge, NativeCall, ResultSink, platform_bridge};
use capnative_core::error::{NativeError, Result};
use capnative_core::types::{CallbackId, PluginReturnType};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::adapter::{NativeAdapter, ResultHandlers, negotiate};
use crate::args::{CallArgs, CallShape, PluginCallback};
use crate::marshal::marshal;
use crate::normalize::settle;
use crate::plugin::{DecoratedNativePlugin, plugin_name};
use crate::registry::NativeMethodRegistry;
use crate::settle::Settlement;
use crate::signature::MethodSignature;

/// The web body of a plugin method, run when not inside a native shell.
#[async_trait]
pub trait WebMethod: Send + Sync {
    async fn call(&self, args: CallArgs) -> Result<Value>;
}

#[async_trait]
impl<F, Fut> WebMethod for F
where
    F: Fn(CallArgs) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    async fn call(&self, args: CallArgs) -> Result<Value> {
        (self)(args).await
    }
}

/// An open keep-alive call: the bridge-facing sink and the caller-facing
/// stream. Both are closed when the call ends.
struct Subscription {
    sink: ResultSink,
    target: Settlement,
}

type Subscriptions = Arc<Mutex<HashMap<CallbackId, Subscription>>>;

struct Inner {
    method_name: String,
    plugin: Arc<dyn DecoratedNativePlugin>,
    signature: MethodSignature,
    return_type: PluginReturnType,
    adapter: Option<NativeAdapter>,
    web: Arc<dyn WebMethod>,
    bridge: Arc<dyn NativeBridge>,
    subscriptions: Subscriptions,
}

/// A plugin method that dispatches natively when it can.
///
/// Cheap to clone; clones share keep-alive subscriptions.
#[derive(Clone)]
pub struct NativeMethod {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for NativeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeMethod")
            .field("method_name", &self.inner.method_name)
            .field("signature", &self.inner.signature)
            .field("return_type", &self.inner.return_type)
            .field("has_adapter", &self.inner.adapter.is_some())
            .finish()
    }
}

impl NativeMethod {
    pub fn builder<'r>(method_name: impl Into<String>) -> NativeMethodBuilder<'r> {
        NativeMethodBuilder {
            method_name: method_name.into(),
            plugin: None,
            signature: None,
            declaration: None,
            return_type: PluginReturnType::default(),
            adapter: None,
            web: None,
            bridge: None,
            registry: None,
        }
    }

    pub fn method_name(&self) -> &str {
        &self.inner.method_name
    }

    pub fn return_type(&self) -> PluginReturnType {
        self.inner.return_type
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.inner.signature
    }

    /// Invoke the method.
    ///
    /// Resolves with the normalized native result (`Promise`), `null`
    /// (`None`), or the callback id of the keep-alive call (`Callback`).
    /// Outside a native shell it resolves with whatever the web body returns.
    ///
    /// A keep-alive call on a bridge that only offers the promise primitive
    /// runs on the current tokio runtime; without one it fails with
    /// [`NativeError::Bridge`].
    #[instrument(skip_all, fields(method = %self.inner.method_name))]
    pub async fn call(&self, args: CallArgs) -> Result<Value> {
        let inner = &self.inner;
        if !inner.bridge.is_native_platform() {
            debug!("not native, running web implementation");
            return inner.web.call(args).await;
        }

        // The name was checked when the method was built, so losing it now
        // is a dispatch failure rather than a configuration error.
        let plugin_name = plugin_name(inner.plugin.as_ref())
            .ok_or_else(|| {
                NativeError::Bridge(format!(
                    "`{}`: plugin no longer reports a registered name",
                    inner.method_name
                ))
            })?
            .to_owned();

        let shape = CallShape::classify(args)?;
        debug!(plugin = %plugin_name, shape = shape.kind(), "dispatching natively");
        let marshalled = marshal(shape, &inner.signature);
        let negotiated = negotiate(inner.adapter.as_ref(), marshalled.options);
        let call = NativeCall::new(plugin_name, inner.method_name.clone(), negotiated.options);

        match inner.return_type {
            PluginReturnType::Promise => self.dispatch_once(call, negotiated.handlers).await,
            PluginReturnType::None => {
                self.dispatch_once(call, negotiated.handlers).await?;
                Ok(Value::Null)
            }
            PluginReturnType::Callback => {
                let callback = marshalled.callback.ok_or_else(|| {
                    NativeError::InvalidArguments(format!(
                        "`{}` reports through a callback but none was passed",
                        inner.method_name
                    ))
                })?;
                let id = self.dispatch_keep_alive(call, negotiated.handlers, callback)?;
                Ok(Value::String(id.0))
            }
        }
    }

    /// End a keep-alive call.
    ///
    /// Later results for `id` are dropped, including ones a custom resolver
    /// settles after this returns, and the bridge is told to release it.
    /// Returns `false` if `id` is unknown or already ended (a failure ends a
    /// keep-alive call on its own).
    pub fn unsubscribe(&self, id: &CallbackId) -> bool {
        let subscription = self
            .inner
            .subscriptions
            .lock()
            .expect("subscriptions lock poisoned")
            .remove(id);
        let Some(subscription) = subscription else {
            return false;
        };
        subscription.sink.close();
        subscription.target.close();
        if let Some(dispatch) = self.inner.bridge.callback_dispatch() {
            dispatch.release(id);
        }
        debug!(method = %self.inner.method_name, callback_id = %id, "keep-alive call released");
        true
    }

    /// Number of keep-alive calls still open.
    pub fn active_subscriptions(&self) -> usize {
        self.inner
            .subscriptions
            .lock()
            .expect("subscriptions lock poisoned")
            .len()
    }

    async fn dispatch_once(&self, call: NativeCall, handlers: ResultHandlers) -> Result<Value> {
        let bridge = &self.inner.bridge;
        let (target, settled) = Settlement::once();

        if let Some(promise) = bridge.promise_dispatch() {
            let result = promise.dispatch_async(call).await;
            settle(result, &handlers, target);
        } else if let Some(dispatch) = bridge.callback_dispatch() {
            let sink = ResultSink::new(false, move |result| {
                settle(result, &handlers, target.clone());
            });
            dispatch.dispatch(call, sink)?;
        } else {
            warn!(platform = bridge.platform_name(), "native shell exposes no dispatch primitive");
            return Err(NativeError::PlatformUnavailable);
        }

        match settled.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => Err(NativeError::Dispatch(error)),
            Err(_) => Err(NativeError::Bridge(format!(
                "`{}` was dropped without settling",
                self.inner.method_name
            ))),
        }
    }

    fn dispatch_keep_alive(
        &self,
        call: NativeCall,
        handlers: ResultHandlers,
        callback: PluginCallback,
    ) -> Result<CallbackId> {
        let bridge = &self.inner.bridge;
        let id = CallbackId::new();
        let call = call.keep_alive(id.clone());
        let target = Settlement::stream(
            callback,
            end_subscription(Arc::downgrade(&self.inner.subscriptions), id.clone()),
        );

        if let Some(dispatch) = bridge.callback_dispatch() {
            let stream = target.clone();
            let sink = ResultSink::new(true, move |result| {
                let failed = result.is_err();
                settle(result, &handlers, stream.clone());
                // A native failure ends the call even if a custom rejecter
                // recovered it.
                if failed {
                    stream.end();
                }
            });
            self.track(&id, &sink, &target);
            if let Err(err) = dispatch.dispatch(call, sink) {
                self.untrack(&id);
                return Err(err);
            }
        } else if bridge.promise_dispatch().is_some() {
            let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
                NativeError::Bridge(format!(
                    "`{}` needs a tokio runtime to run a keep-alive call over the promise primitive",
                    self.inner.method_name
                ))
            })?;
            // A promise primitive answers once; the callback fires at most once.
            let stream = target.clone();
            let sink = ResultSink::new(false, move |result| {
                settle(result, &handlers, stream.clone());
            });
            self.track(&id, &sink, &target);
            let bridge = Arc::clone(bridge);
            let subscriptions = Arc::clone(&self.inner.subscriptions);
            let sub_id = id.clone();
            runtime.spawn(async move {
                if let Some(promise) = bridge.promise_dispatch() {
                    let result = promise.dispatch_async(call).await;
                    subscriptions
                        .lock()
                        .expect("subscriptions lock poisoned")
                        .remove(&sub_id);
                    sink.settle(result);
                }
            });
        } else {
            warn!(platform = bridge.platform_name(), "native shell exposes no dispatch primitive");
            return Err(NativeError::PlatformUnavailable);
        }

        Ok(id)
    }

    fn track(&self, id: &CallbackId, sink: &ResultSink, target: &Settlement) {
        self.inner
            .subscriptions
            .lock()
            .expect("subscriptions lock poisoned")
            .insert(
                id.clone(),
                Subscription {
                    sink: sink.clone(),
                    target: target.clone(),
                },
            );
    }

    fn untrack(&self, id: &CallbackId) {
        self.inner
            .subscriptions
            .lock()
            .expect("subscriptions lock poisoned")
            .remove(id);
    }
}

/// Drop the subscription for `id` once its stream has ended, so the bridge
/// sink stops accepting results too.
fn end_subscription(
    subscriptions: Weak<Mutex<HashMap<CallbackId, Subscription>>>,
    id: CallbackId,
) -> impl Fn() + Send + Sync + 'static {
    move || {
        let Some(subscriptions) = subscriptions.upgrade() else {
            return;
        };
        let ended = subscriptions
            .lock()
            .expect("subscriptions lock poisoned")
            .remove(&id);
        if let Some(subscription) = ended {
            subscription.sink.close();
            debug!(callback_id = %id, "keep-alive call ended by failure");
        }
    }
}

/// Configuration of a native method, validated by [`build`](Self::build).
pub struct NativeMethodBuilder<'r> {
    method_name: String,
    plugin: Option<Arc<dyn DecoratedNativePlugin>>,
    signature: Option<MethodSignature>,
    declaration: Option<String>,
    return_type: PluginReturnType,
    adapter: Option<NativeAdapter>,
    web: Option<Arc<dyn WebMethod>>,
    bridge: Option<Arc<dyn NativeBridge>>,
    registry: Option<&'r mut NativeMethodRegistry>,
}

impl<'r> NativeMethodBuilder<'r> {
    /// The plugin the method belongs to; supplies the registered name.
    pub fn plugin(mut self, plugin: Arc<dyn DecoratedNativePlugin>) -> Self {
        self.plugin = Some(plugin);
        self
    }

    /// The web body run outside a native shell.
    pub fn web(mut self, body: impl WebMethod + 'static) -> Self {
        self.web = Some(Arc::new(body));
        self
    }

    /// Declared parameter names, for zipping positional arguments.
    pub fn signature(mut self, signature: MethodSignature) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Parse parameter names from a declaration like `echo(value, times)`.
    pub fn declaration(mut self, declaration: impl Into<String>) -> Self {
        self.declaration = Some(declaration.into());
        self
    }

    pub fn return_type(mut self, return_type: PluginReturnType) -> Self {
        self.return_type = return_type;
        self
    }

    pub fn adapter(mut self, adapter: impl Into<NativeAdapter>) -> Self {
        self.adapter = Some(adapter.into());
        self
    }

    /// Bridge to dispatch through. Defaults to the process-wide bridge.
    pub fn bridge(mut self, bridge: Arc<dyn NativeBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Record the method in `registry` for the build-time generator.
    pub fn register_in(mut self, registry: &'r mut NativeMethodRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<NativeMethod> {
        let method_name = self.method_name.trim().to_owned();
        let web = match self.web {
            Some(web) if !method_name.is_empty() => web,
            _ => {
                return Err(NativeError::config(format!(
                    "native dispatch can only wrap instance methods: `{method_name}` has no method body"
                )));
            }
        };

        let plugin = self.plugin.ok_or_else(|| {
            NativeError::config(format!(
                "`{method_name}`: method resolution requires a plugin name accessor"
            ))
        })?;
        let registered = plugin_name(plugin.as_ref())
            .ok_or_else(|| {
                NativeError::config(format!(
                    "`{method_name}`: method resolution requires a plugin name accessor (the plugin reports no name)"
                ))
            })?
            .to_owned();

        let signature = match (self.declaration, self.signature) {
            (Some(declaration), _) => MethodSignature::parse(&declaration)?,
            (None, Some(signature)) => signature,
            (None, None) => MethodSignature::empty(),
        };

        if let Some(registry) = self.registry {
            registry.record(&registered, &method_name, self.return_type);
        }

        debug!(
            plugin = %registered,
            method = %method_name,
            arity = signature.arity(),
            return_type = ?self.return_type,
            "native method built"
        );

        Ok(NativeMethod {
            inner: Arc::new(Inner {
                method_name,
                plugin,
                signature,
                return_type: self.return_type,
                adapter: self.adapter,
                web,
                bridge: self.bridge.unwrap_or_else(platform_bridge),
                subscriptions: Arc::new(Mutex::new(HashMap::new())),
            }),
        })
    }
}
