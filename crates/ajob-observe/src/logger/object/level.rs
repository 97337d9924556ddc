use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::logger::LoggerError;

/// An `EnvFilter` directive string that is known to parse.
///
/// `EnvFilter` is not `Clone`, so the text is kept and the filter is rebuilt on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoggerLevel(String);

impl LoggerLevel {
    /// ```
    /// use ajob_observe::LoggerLevel;
    ///
    /// assert!(LoggerLevel::new("ajob_core=debug,warn").is_ok());
    /// assert!(LoggerLevel::new("ajob_core=loud").is_err());
    /// ```
    pub fn new(directives: impl Into<String>) -> Result<Self, LoggerError> {
        let directives = directives.into();
        build(&directives)?;
        Ok(Self(directives))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_env_filter(&self) -> Result<EnvFilter, LoggerError> {
        build(&self.0)
    }
}

fn build(directives: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(directives)
        .map_err(|e| LoggerError::InvalidLevel(format!("{directives:?}: {e}")))
}

impl Default for LoggerLevel {
    fn default() -> Self {
        Self(String::from("info"))
    }
}

impl FromStr for LoggerLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LoggerLevel {
    type Error = LoggerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<LoggerLevel> for String {
    fn from(level: LoggerLevel) -> Self {
        level.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_levels_and_per_target_directives_parse() {
        for directives in ["trace", "warn", "ajob_core=trace,ajob_api=debug,info"] {
            let level: LoggerLevel = directives.parse().unwrap();
            assert_eq!(level.as_str(), directives);
            assert!(level.to_env_filter().is_ok());
        }
    }

    #[test]
    fn unknown_level_names_are_rejected() {
        for directives in ["ajob_core=verbose", "info,ajob_api=chatty"] {
            let err = LoggerLevel::new(directives).unwrap_err();
            assert!(matches!(err, LoggerError::InvalidLevel(_)), "{directives}");
        }
    }

    #[test]
    fn deserializes_from_bare_string() {
        let level: LoggerLevel = serde_json::from_str(r#""debug""#).unwrap();
        assert_eq!(level, LoggerLevel::new("debug").unwrap());
        assert_eq!(serde_json::to_string(&level).unwrap(), r#""debug""#);
    }
}
