use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format {0:?}, expected text, json, gcp or journald")]
    InvalidFormat(String),

    #[error("journald output is only available on Linux")]
    JournaldNotSupported,

    #[error("journald socket unavailable: {0}")]
    Journald(String),

    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,

    #[error("unknown timezone {0:?}, expected utc or local")]
    InvalidTimeZone(String),

    #[error("invalid log filter: {0}")]
    InvalidLevel(String),
}

pub type LoggerResult<T> = Result<T, LoggerError>;
