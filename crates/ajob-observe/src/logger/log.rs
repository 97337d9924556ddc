use tracing_subscriber::{Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::logger::{
    config::LoggerConfig,
    error::{LoggerError, LoggerResult},
    object::{GcpFormat, LoggerFormat, LoggerRfc3339},
};

type OutputLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Installs `registry + output layer + level filter` as the global default.
pub(crate) fn install(cfg: &LoggerConfig) -> LoggerResult<()> {
    let filter = cfg.level.to_env_filter()?;
    let output = output_layer(cfg)?;

    tracing_subscriber::registry()
        .with(output)
        .with(filter)
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}

/// Builds the layer writing events in the configured format.
fn output_layer(cfg: &LoggerConfig) -> LoggerResult<OutputLayer> {
    let timer = LoggerRfc3339::new(cfg.tz);

    let layer = match cfg.format {
        LoggerFormat::Text => fmt::layer()
            .with_ansi(cfg.should_use_color())
            .with_target(cfg.with_targets)
            .with_timer(timer)
            .boxed(),
        LoggerFormat::Json => fmt::layer()
            .json()
            .with_target(cfg.with_targets)
            .with_timer(timer)
            .boxed(),
        LoggerFormat::Gcp => fmt::layer()
            .with_ansi(false)
            .event_format(GcpFormat::new(cfg.tz).with_target(cfg.with_targets))
            .boxed(),
        LoggerFormat::Journald => journald_layer()?,
    };
    Ok(layer)
}

#[cfg(target_os = "linux")]
fn journald_layer() -> LoggerResult<OutputLayer> {
    tracing_journald::layer()
        .map(Layer::boxed)
        .map_err(|e| LoggerError::Journald(e.to_string()))
}

#[cfg(not(target_os = "linux"))]
fn journald_layer() -> LoggerResult<OutputLayer> {
    Err(LoggerError::JournaldNotSupported)
}
