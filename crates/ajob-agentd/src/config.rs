//! Process configuration read from the environment.
//!
//! | Variable                  | Default                   |
//! |---------------------------|---------------------------|
//! | `LOG_LEVEL`               | `info`                    |
//! | `LOG_FORMAT`              | `gcp`                     |
//! | `LOG_TZ`                  | `utc`                     |
//! | `PORT`                    | `8080`                    |
//! | `DEFAULT_TIMEOUT`         | `10s`                     |
//! | `WEBHOOK_SECRET`          | required                  |
//! | `GITHUB_TOKEN`            | required                  |
//! | `GITHUB_API_URL`          | `https://api.github.com`  |
//! | `GH_REQUEST_TIMEOUT`      | `1s`                      |
//! | `CLOUD_RUN_ENDPOINT`      | regional endpoint         |
//! | `GCP_PROJECT`             | metadata server           |
//! | `GCP_REGION`              | metadata server           |
//! | `GCP_ACCESS_TOKEN`        | metadata server           |
//! | `JOB_READY_TIMEOUT`       | `5s`                      |
//! | `JOB_READY_FIRST_BACKOFF` | `10ms`                    |
//! | `JOB_READY_MAX_BACKOFF`   | `5s`                      |
//! | `SERIALIZE_SAME_JOB`      | `false`                   |
//! | `CAPABILITY_LABEL`        | `self-hosted`             |
use std::{
    fmt,
    str::FromStr,
    time::{Duration, Instant},
};

use ajob_adapter::github::DEFAULT_API_URL;
use ajob_core::dispatch::ReadinessPolicy;
use ajob_model::{BackoffStrategy, CAPABILITY_LABEL, Flag};
use ajob_observe::{LoggerConfig, LoggerFormat, LoggerLevel, LoggerTimeZone};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone)]
pub struct Config {
    pub logger: LoggerConfig,
    pub port: u16,
    /// Deadline of one webhook delivery, readiness wait included.
    pub request_timeout: Duration,
    pub webhook_secret: String,
    pub github_token: String,
    pub github_api_url: String,
    pub github_timeout: Duration,
    pub cloud_run_endpoint: Option<String>,
    pub project: Option<String>,
    pub region: Option<String>,
    pub access_token: Option<String>,
    pub readiness: ReadinessPolicy,
    pub serialize_same_job: bool,
    pub capability: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("logger", &self.logger)
            .field("port", &self.port)
            .field("request_timeout", &self.request_timeout)
            .field("webhook_secret", &"<redacted>")
            .field("github_token", &"<redacted>")
            .field("github_api_url", &self.github_api_url)
            .field("github_timeout", &self.github_timeout)
            .field("cloud_run_endpoint", &self.cloud_run_endpoint)
            .field("project", &self.project)
            .field("region", &self.region)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("readiness", &self.readiness)
            .field("serialize_same_job", &self.serialize_same_job)
            .field("capability", &self.capability)
            .finish()
    }
}

impl Config {
    /// Read the process environment, seeded from `.env` when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let logger = LoggerConfig {
            format: parse_or(&get, "LOG_FORMAT", LoggerFormat::Gcp)?,
            level: parse_or(&get, "LOG_LEVEL", LoggerLevel::default())?,
            tz: parse_or(&get, "LOG_TZ", LoggerTimeZone::Utc)?,
            ..Default::default()
        };

        let first = duration_or(&get, "JOB_READY_FIRST_BACKOFF", Duration::from_millis(10))?;
        let max = duration_or(&get, "JOB_READY_MAX_BACKOFF", Duration::from_secs(5))?;
        let backoff = BackoffStrategy::doubling(millis(first), millis(max));
        backoff.validate().map_err(|e| ConfigError::Invalid {
            key: "JOB_READY_FIRST_BACKOFF",
            value: format!("{first:?}..{max:?}"),
            reason: e.to_string(),
        })?;
        let readiness = ReadinessPolicy {
            backoff,
            deadline: duration_or(&get, "JOB_READY_TIMEOUT", Duration::from_secs(5))?,
        };

        let serialize_same_job =
            Flag::from_env_value(get("SERIALIZE_SAME_JOB").as_deref()).is_enabled();

        Ok(Self {
            logger,
            port: parse_or(&get, "PORT", 8080u16)?,
            request_timeout: duration_or(&get, "DEFAULT_TIMEOUT", Duration::from_secs(10))?,
            webhook_secret: get("WEBHOOK_SECRET").ok_or(ConfigError::Missing("WEBHOOK_SECRET"))?,
            github_token: get("GITHUB_TOKEN").ok_or(ConfigError::Missing("GITHUB_TOKEN"))?,
            github_api_url: get("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            github_timeout: duration_or(&get, "GH_REQUEST_TIMEOUT", Duration::from_secs(1))?,
            cloud_run_endpoint: get("CLOUD_RUN_ENDPOINT"),
            project: get("GCP_PROJECT"),
            region: get("GCP_REGION"),
            access_token: get("GCP_ACCESS_TOKEN"),
            readiness,
            serialize_same_job,
            capability: get("CAPABILITY_LABEL").unwrap_or_else(|| CAPABILITY_LABEL.to_string()),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw,
            reason: e.to_string(),
        }),
    }
}

fn duration_or<G>(get: &G, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let Some(raw) = get(key) else {
        return Ok(default);
    };
    let invalid = |reason: String| ConfigError::Invalid {
        key,
        value: raw.clone(),
        reason,
    };

    let d = humantime::parse_duration(&raw).map_err(|e| invalid(e.to_string()))?;
    if Instant::now().checked_add(d).is_none() {
        return Err(invalid("duration is too large".into()));
    }
    Ok(d)
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
