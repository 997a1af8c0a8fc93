//! Log subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Install a stderr `fmt` subscriber. `RUST_LOG` wins when set; otherwise
/// `warn`, or `debug` for this crate when `verbose` is on.
///
/// Safe to call more than once (later calls are no-ops).
pub fn init(verbose: bool) {
    let default_directive = if verbose { "bankledger=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
