// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt};

static TRACING_INIT: Once = Once::new();

/// Environment variable holding an `EnvFilter` directive, e.g. `pennywise=debug`.
pub const LOG_ENV: &str = "PENNYWISE_LOG";

const DEFAULT_DIRECTIVE: &str = "pennywise=warn";

/// Installs the global subscriber once. Logs go to stderr so table and JSON
/// output on stdout stays machine-readable.
pub fn init() {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
