//! Tracing setup for the binary

use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured log level
pub const LOG_ENV: &str = "FTF_LOG";

/// `FTF_LOG` wins over the configured level; an unparsable value falls back
/// to `warn`.
pub fn filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install a stderr subscriber so logs never mix with command output
pub fn init(configured: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(configured))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
