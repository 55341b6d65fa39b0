//! Log output for binaries and demos.
//!
//! The library only emits `tracing` events; nothing is printed until a
//! subscriber is installed here or by the embedding application.

use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber filtered by `RUST_LOG`, or by
/// `default_directive` (e.g. `"info"`, `"lly_dml=debug"`) when it is unset.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init().is_ok()
}
