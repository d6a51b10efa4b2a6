use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingSettings;

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured level. Format is `pretty` or `json`;
/// anything else falls back to the compact text format. Returns an error if a
/// subscriber is already installed.
pub fn init(settings: &LoggingSettings) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let registry = tracing_subscriber::registry().with(filter);

    match settings.format.as_str() {
        "pretty" => registry
            .with(fmt::layer().pretty().with_target(false))
            .try_init(),
        "json" => registry
            .with(fmt::layer().json().with_target(false))
            .try_init(),
        _ => registry
            .with(fmt::layer().compact().with_target(false))
            .try_init(),
    }
}
