//! Log subscriber setup.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize the tracing subscriber for engine diagnostics.
///
/// Does nothing unless `RUST_LOG` is set. Safe to call repeatedly; only the
/// first call installs a subscriber.
///
/// ```text
/// RUST_LOG=casein_eval=debug   # arm matches, commits, aborts
/// RUST_LOG=casein_eval=trace   # every arm attempt, find window and cache hit
/// ```
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
