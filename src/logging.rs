use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: &str = "info";

static INIT_GUARD: OnceLock<()> = OnceLock::new();

/// Install a stderr subscriber. The level comes from `level`, then
/// `RUST_LOG`, then defaults to `info`. Later calls are no-ops.
pub fn initialize_logging(level: Option<&str>) {
    if INIT_GUARD.set(()).is_err() {
        return;
    }

    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL)),
    };

    // Another subscriber may already be installed by an embedding application
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
