#![forbid(unsafe_code)]

//! Structured logging facade.
//!
//! With the `tracing` feature enabled this module re-exports the `tracing`
//! macros so call sites can write `crate::logging::debug!`. Without the
//! feature nothing is exported and every call site is compiled out behind
//! `#[cfg(feature = "tracing")]`.
//!
//! The `tracing-json` feature additionally exposes [`init_json_subscriber`]
//! for hosts that want machine-readable logs without wiring a subscriber
//! themselves.

#[cfg(feature = "tracing")]
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

/// Install a global JSON subscriber filtered by `RUST_LOG`.
///
/// Returns `false` if a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_subscriber() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
