mod config;
mod error;
mod log;
mod object;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use object::{GcpFormat, LoggerFormat, LoggerLevel, LoggerRfc3339};
pub use object::{LoggerTimeZone, init_local_offset};

/// Install the process-wide `tracing` subscriber described by `cfg`.
///
/// Fails with [`LoggerError::AlreadyInitialized`] when a subscriber is already set.
/// For `LoggerTimeZone::Local`, call [`init_local_offset`] first, before the runtime
/// spawns worker threads.
///
/// ```rust
/// use ajob_observe::{LoggerConfig, LoggerFormat, init_logger};
///
/// let cfg = LoggerConfig {
///     format: LoggerFormat::Gcp,
///     ..Default::default()
/// };
/// init_logger(&cfg).expect("logger");
/// tracing::info!(job = "proj/us-central1/runner", "dispatching");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    log::install(cfg)
}
