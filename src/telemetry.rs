//! Telemetry helpers for structured logging.

/// Installs a default env-filtered `tracing` subscriber unless one is set.
///
/// The planner only emits events; binaries and tests that want to see them
/// call this once (or install their own subscriber). Honors `RUST_LOG`.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}
