use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs a stderr subscriber filtered by `RUST_LOG` (default
/// `kanatype=info`). Later calls do nothing.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kanatype=info"));
        // a subscriber installed by the embedding program wins
        let _ = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_env_filter(filter)
            .try_init();
    });
}
