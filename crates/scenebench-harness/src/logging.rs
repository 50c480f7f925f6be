//! Subscriber setup for the `scenebench` binary
//!
//! Libraries only emit `tracing` events; the binary installs the
//! subscriber once. Output goes to stderr so JSON written to stdout by
//! `score` stays machine-readable.

use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

/// Filter used by `--verbose`, overriding `RUST_LOG`
pub const VERBOSE_FILTER: &str = "debug";

/// Build the event filter for the given verbosity
#[must_use]
pub fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber
///
/// Returns `false` when a subscriber was already installed.
pub fn init(verbose: bool, json: bool) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };
    if installed {
        tracing::debug!(verbose, json, "logging initialised");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn verbose_filter_enables_debug() {
        assert_eq!(env_filter(true).max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn second_init_is_a_no_op() {
        let _ = init(false, false);
        assert!(!init(false, true));
    }
}
