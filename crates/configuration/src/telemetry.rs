use crate::error::ConfigError;
use crate::settings::{LogFormat, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Console output goes to stderr
/// so stdout stays clean for reports. When a log directory is configured, a
/// daily rolling file is written as well; the returned guard must be held for
/// the life of the process or buffered lines are lost.
pub fn init_tracing(config: &LoggingConfig) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| {
            ConfigError::ValidationError(format!("invalid log level '{}': {}", config.level, e))
        })?;

    let compact = (config.format == LogFormat::Compact)
        .then(|| fmt::layer().compact().with_target(true).with_writer(std::io::stderr));
    let pretty = (config.format == LogFormat::Pretty).then(|| {
        fmt::layer()
            .pretty()
            .with_target(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
    });

    let (file_layer, guard) = match &config.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(compact)
        .with(pretty)
        .with(file_layer)
        .try_init()
        .map_err(|e| ConfigError::Telemetry(e.to_string()))?;

    tracing::debug!(level = %config.level, "tracing initialised");
    Ok(guard)
}
