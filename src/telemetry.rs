use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber for external callers
///
/// The library itself only emits events; binaries embedding it call this
/// once at startup. Filtering is controlled via `RUST_LOG`.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
