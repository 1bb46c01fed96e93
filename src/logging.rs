use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::debug_enabled;

/// Initializes logging for a binary. `RUST_LOG` wins when set; otherwise
/// the `DEBUG=true` environment toggle selects the debug level.
pub fn init_tracing() {
    let default_directive = if debug_enabled() {
        "zendesk_translate=debug"
    } else {
        "zendesk_translate=info"
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .init();
}
