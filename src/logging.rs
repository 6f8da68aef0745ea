//! Diagnostic logging setup.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs a stderr subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set, so stdout and stderr carry only the
/// result and the one-line diagnostic by default. Safe to call repeatedly.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(filter)
                .try_init();
        }
    });
}
