// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! capnative: native bridge abstractions.
//!
//! This crate defines the capability traits a host shell exposes to script
//! code: a predicate telling whether we run inside a native shell, and one or
//! both dispatch primitives (callback-passing and promise-returning). The
//! call adapter in `capnative-dispatch` works against whichever primitive the
//! installed bridge offers.

use std::sync::{Arc, OnceLock};

use capnative_core::error::{NativeError, Result};

pub mod scripted;
pub mod stub;
pub mod traits;

pub use scripted::{ScriptedBridge, ScriptedMode};
pub use stub::WebBridge;
pub use traits::{CallbackDispatch, NativeBridge, NativeCall, PromiseDispatch, ResultSink};

static INSTALLED: OnceLock<Arc<dyn NativeBridge>> = OnceLock::new();

/// Install the process-wide bridge. The host shell calls this once at startup.
///
/// RETURNS: `Bridge` error if a bridge was already installed.
pub fn install_bridge(bridge: Arc<dyn NativeBridge>) -> Result<()> {
    let name = bridge.platform_name().to_owned();
    INSTALLED
        .set(bridge)
        .map_err(|_| NativeError::Bridge("a native bridge is already installed".into()))?;
    tracing::info!(platform = %name, "native bridge installed");
    Ok(())
}

/// Retrieves the process-wide bridge.
///
/// Falls back to the web bridge (not native, no dispatch primitives) when no
/// host shell installed one, which is the browser case.
pub fn platform_bridge() -> Arc<dyn NativeBridge> {
    match INSTALLED.get() {
        Some(bridge) => Arc::clone(bridge),
        None => Arc::new(WebBridge),
    }
}
