///! Helpers to wrangle logging across meshauth crates
///! NOTE: [initialize_tracing] should only ever be called in tests or binaries;
///! a library should only concern itself with instrumentation and logging.
use std::sync::Once;

static INITIALIZE_TRACING: Once = Once::new();

/// Install a global subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter` (or informational logging for the meshauth crates)
pub fn initialize_tracing(default_filter: Option<&str>) {
    use tracing_subscriber::prelude::*;
    INITIALIZE_TRACING.call_once(|| {
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
            default_filter
                .unwrap_or("meshauth_core=info,meshauth_gateway=info,tower_http=info")
                .into()
        });

        if let Err(error) = tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(filter))
            .with(tracing_subscriber::fmt::layer())
            .try_init()
        {
            eprintln!("Tracing was already initialized: {error}");
        }
    });
}
