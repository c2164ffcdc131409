use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs the global tracing subscriber once, writing to stderr.
///
/// Filter precedence: `TEMPO_LOG`, then `RUST_LOG`, then `default_filter`
/// (the config's `logging.level`). An unparsable filter falls back to `warn`.
pub fn init_logging(default_filter: &str) {
    INIT.call_once(|| {
        let directive = std::env::var("TEMPO_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| default_filter.to_string());
        let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

        // Stdout carries the display and JSON events.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();

        tracing::debug!(%directive, "logging initialized");
    });
}
