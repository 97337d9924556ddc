use std::{fmt, str::FromStr, sync::OnceLock};

use serde::{Deserialize, Serialize};
use time::UtcOffset;

use crate::logger::error::LoggerError;

/// Local UTC offset, captured once by [`init_local_offset`].
static LOCAL_OFFSET: OnceLock<UtcOffset> = OnceLock::new();

/// Timezone configuration for log timestamps.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoggerTimeZone {
    /// UTC timezone.
    #[default]
    Utc,
    /// Local system timezone.
    Local,
}

impl LoggerTimeZone {
    /// Offset used when formatting timestamps.
    ///
    /// `Local` falls back to UTC until [`init_local_offset`] succeeded.
    pub fn offset(self) -> UtcOffset {
        match self {
            LoggerTimeZone::Utc => UtcOffset::UTC,
            LoggerTimeZone::Local => LOCAL_OFFSET.get().copied().unwrap_or(UtcOffset::UTC),
        }
    }
}

impl FromStr for LoggerTimeZone {
    type Err = LoggerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utc" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            _ => Err(LoggerError::InvalidTimeZone(s.to_string())),
        }
    }
}

impl fmt::Display for LoggerTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoggerTimeZone::Utc => "utc",
            LoggerTimeZone::Local => "local",
        };
        f.write_str(s)
    }
}

/// Captures the local timezone offset.
///
/// **Call in `main()` before the tokio runtime starts.** Offset detection fails
/// in multi-threaded processes on most Unix platforms; in that case timestamps stay UTC.
///
/// Returns the offset that will be used for `LoggerTimeZone::Local`.
pub fn init_local_offset() -> UtcOffset {
    *LOCAL_OFFSET.get_or_init(|| UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC))
}
