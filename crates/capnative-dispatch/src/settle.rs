// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settlement handles.
//
// A promise-style call settles a one-shot channel; a callback-style call
// forwards every outcome to the caller's callback. Custom resolvers receive a
// `Resolver`/`Rejecter` and decide when (and whether) to settle, so the
// handles are `Send + 'static` and may be moved into another task.
//
// A stream ends at its first failure or when closed; nothing reaches the
// callback after that, whichever handle tries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use capnative_core::types::PluginError;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::args::PluginCallback;

/// What a call settles with: the normalized value or the failure payload.
pub type CallOutcome = std::result::Result<Value, PluginError>;

#[derive(Clone)]
pub(crate) enum Settlement {
    Once(Arc<Mutex<Option<oneshot::Sender<CallOutcome>>>>),
    Stream(Arc<Stream>),
}

pub(crate) struct Stream {
    callback: PluginCallback,
    closed: AtomicBool,
    on_end: Box<dyn Fn() + Send + Sync>,
}

impl Settlement {
    pub(crate) fn once() -> (Self, oneshot::Receiver<CallOutcome>) {
        let (tx, rx) = oneshot::channel();
        (Self::Once(Arc::new(Mutex::new(Some(tx)))), rx)
    }

    /// A keep-alive target. `on_end` runs once, after the failure that ends
    /// the stream is delivered.
    pub(crate) fn stream(
        callback: PluginCallback,
        on_end: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self::Stream(Arc::new(Stream {
            callback,
            closed: AtomicBool::new(false),
            on_end: Box::new(on_end),
        }))
    }

    /// Stop delivering without running `on_end`. Returns `true` if the
    /// target was still open.
    pub(crate) fn close(&self) -> bool {
        match self {
            Self::Once(slot) => slot.lock().expect("settlement lock poisoned").take().is_some(),
            Self::Stream(stream) => !stream.closed.swap(true, Ordering::AcqRel),
        }
    }

    /// End the stream as a failure would, without delivering anything.
    pub(crate) fn end(&self) {
        if let Self::Stream(stream) = self {
            if !stream.closed.swap(true, Ordering::AcqRel) {
                (stream.on_end)();
            }
        }
    }

    fn deliver(&self, outcome: CallOutcome) -> bool {
        match self {
            Self::Once(slot) => {
                let sender = slot.lock().expect("settlement lock poisoned").take();
                match sender {
                    Some(tx) => tx.send(outcome).is_ok(),
                    None => false,
                }
            }
            Self::Stream(stream) => match outcome {
                Ok(value) => {
                    if stream.closed.load(Ordering::Acquire) {
                        tracing::debug!("success on an ended stream, dropped");
                        return false;
                    }
                    (stream.callback)(Ok(value));
                    true
                }
                Err(error) => {
                    if stream.closed.swap(true, Ordering::AcqRel) {
                        tracing::debug!(error = %error, "failure on an ended stream, dropped");
                        return false;
                    }
                    (stream.callback)(Err(error));
                    (stream.on_end)();
                    true
                }
            },
        }
    }
}

/// Handle a success resolver calls to settle the call.
pub struct Resolver {
    target: Settlement,
}

impl Resolver {
    pub(crate) fn new(target: Settlement) -> Self {
        Self { target }
    }

    /// Settle with `value`. Returns `false` if the call already settled or
    /// the caller stopped waiting.
    pub fn resolve(self, value: Value) -> bool {
        self.target.deliver(Ok(value))
    }

    /// Settle as a failure instead.
    pub fn reject(self, error: PluginError) -> bool {
        self.target.deliver(Err(error))
    }
}

/// Handle a failure resolver calls to reject the call.
pub struct Rejecter {
    target: Settlement,
}

impl Rejecter {
    pub(crate) fn new(target: Settlement) -> Self {
        Self { target }
    }

    pub fn reject(self, error: PluginError) -> bool {
        self.target.deliver(Err(error))
    }

    /// Recover: settle as a success instead.
    pub fn resolve(self, value: Value) -> bool {
        self.target.deliver(Ok(value))
    }
}
