// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Web bridge for browser builds and CI, where no native shell is present.
//
// Reports "not native" and exposes no dispatch primitive, so every decorated
// method runs its own web body.

use crate::traits::NativeBridge;

/// Bridge returned when no host shell installed one.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebBridge;

impl NativeBridge for WebBridge {
    fn platform_name(&self) -> &str {
        "web"
    }

    fn is_native_platform(&self) -> bool {
        false
    }
}
