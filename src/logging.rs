//! Tracing subscriber setup for hosts that don't install their own.

use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "warn";

/// Installs a compact stderr subscriber honoring `RUST_LOG`.
///
/// # Panics
///
/// Panics if a global subscriber is already set. Use [`try_init_tracing`]
/// when that may be the case.
pub fn init_tracing() {
    fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .without_time()
        .init();
}

/// Like [`init_tracing`], but returns false instead of panicking when a
/// subscriber is already installed.
pub fn try_init_tracing() -> bool {
    fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .without_time()
        .try_init()
        .is_ok()
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
