//! Tracing subscriber setup
//!
//! One JSON line per event on stderr, keeping stdout free for command
//! output. `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Safe to call more than once; only the first call takes effect.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}
