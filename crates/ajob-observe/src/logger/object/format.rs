use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::logger::LoggerError;

/// Where and how events are written.
///
/// `Gcp` is the production default of the agent: one JSON object per line with the
/// `severity`, `time` and `message` keys Cloud Logging understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LoggerFormat {
    #[default]
    Text,
    Json,
    Gcp,
    /// Linux only.
    Journald,
}

impl LoggerFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Gcp => "gcp",
            Self::Journald => "journald",
        }
    }
}

impl FromStr for LoggerFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format = match s.trim().to_ascii_lowercase().as_str() {
            "text" => Self::Text,
            "json" => Self::Json,
            "gcp" | "stackdriver" => Self::Gcp,
            "journald" | "journal" if cfg!(target_os = "linux") => Self::Journald,
            "journald" | "journal" => return Err(LoggerError::JournaldNotSupported),
            _ => return Err(LoggerError::InvalidFormat(s.to_string())),
        };
        Ok(format)
    }
}

impl TryFrom<String> for LoggerFormat {
    type Error = LoggerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<LoggerFormat> for String {
    fn from(f: LoggerFormat) -> Self {
        f.as_str().to_string()
    }
}

impl fmt::Display for LoggerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
