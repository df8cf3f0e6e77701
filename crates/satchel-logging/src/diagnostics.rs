//! The library's own diagnostics
//!
//! Internal events (sink failures, config fallbacks, archive progress) go
//! through `tracing` and are kept separate from the host-facing [`Logger`].
//!
//! [`Logger`]: crate::Logger

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the diagnostics filter, e.g. `satchel=debug`
pub const DIAGNOSTICS_ENV_VAR: &str = "SATCHEL_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install a stderr subscriber for internal diagnostics
///
/// Safe to call more than once. If the host process already installed a
/// global subscriber, that one is kept.
pub fn init_diagnostics() {
    static INIT: OnceCell<()> = OnceCell::new();

    INIT.get_or_init(|| {
        use tracing_subscriber::prelude::*;

        let filter = EnvFilter::try_from_env(DIAGNOSTICS_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let subscriber = tracing_subscriber::registry().with(filter).with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        );

        // Try to set as global default (ignore error if already set)
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
