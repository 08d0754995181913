//! `tracing-subscriber` init helper, the piece `spec.md`'s "structured
//! logging at every state transition" ambient requirement needs a host
//! binary to call once at startup; this crate does not install a global
//! subscriber on its own.

use tracing_subscriber::EnvFilter;

/// Installs a `tracing-subscriber` formatter reading `RUST_LOG` (default
/// `info`), matching `hickory-proto`'s own examples' init pattern. Panics
/// if a global subscriber is already installed; call this once, early.
pub fn init_default_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}
