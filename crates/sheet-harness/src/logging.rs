#![forbid(unsafe_code)]

//! Test logging setup.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "sheet_core=warn,sheet_harness=info";

/// Install a test-friendly `fmt` subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test: only the first call installs anything.
/// Returns whether this call installed the subscriber.
pub fn init_test_logging() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(true)
        .try_init()
        .is_ok()
}
