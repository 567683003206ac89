//! Logging initialization.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the verbosity flag count picks the
/// level, falling back to the configured default filter at zero.
pub fn init_logging(verbosity: u8, default_filter: &str) {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(env) => EnvFilter::new(env),
        Err(_) => {
            let directive = match verbosity {
                0 => default_filter,
                1 => "info",
                2 => "debug",
                _ => "trace",
            };
            EnvFilter::new(directive)
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
