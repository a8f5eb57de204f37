//! Logging setup for tests: one global subscriber, honoring `RUST_LOG`.

use std::sync::Once;

use tracing::debug;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

static LOGGING: Once = Once::new();

/// Route `tracing` output through the test harness. `RUST_LOG` overrides `fmodel=debug`.
pub fn init_test_setup() {
    LOGGING.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fmodel=debug"));
        let layer = fmt::layer()
            .with_test_writer()
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(filter);

        // Another harness may have installed a global subscriber first
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            debug!("keeping existing tracing subscriber");
        }
    });
}
