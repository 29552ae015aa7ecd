//! Library half of the `namescope` CLI.
//!
//! Commands live here rather than in `main.rs` so they can be exercised from
//! integration tests without spawning the binary.

use tracing_subscriber::EnvFilter;

pub mod commands;

pub use commands::*;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects `debug` and the
/// default is `warn`. Safe to call more than once (later calls are no-ops).
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
