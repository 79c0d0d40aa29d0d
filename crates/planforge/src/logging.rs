//! Console logging for solver runs.
//!
//! The solver only emits `tracing` events; nothing is printed until a
//! subscriber is installed. [`init`] installs a compact formatter filtered
//! by `RUST_LOG`, falling back to [`DEFAULT_DIRECTIVES`].

use std::sync::OnceLock;

use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVES: &str = "planforge_solver=info";

static INIT: OnceLock<bool> = OnceLock::new();

/// Initializes console logging.
///
/// Safe to call multiple times - only the first call has effect. Returns
/// false when another global subscriber was already installed.
pub fn init() -> bool {
    *INIT.get_or_init(|| install(filter_from_env()))
}

/// Like [`init`], but with explicit filter directives instead of `RUST_LOG`.
pub fn init_with_directives(directives: &str) -> bool {
    *INIT.get_or_init(|| {
        let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| default_filter());
        install(filter)
    })
}

fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter())
}

fn default_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_DIRECTIVES)
}

fn install(filter: EnvFilter) -> bool {
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(true).with_thread_names(true))
        .try_init()
        .is_ok()
}
