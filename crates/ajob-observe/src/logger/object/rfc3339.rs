use std::fmt;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

use crate::logger::object::LoggerTimeZone;

/// RFC3339 timestamp formatter honouring the configured timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggerRfc3339 {
    tz: LoggerTimeZone,
}

impl LoggerRfc3339 {
    pub fn new(tz: LoggerTimeZone) -> Self {
        Self { tz }
    }

    /// Current time as an RFC3339 string, `None` if formatting failed.
    pub fn now(&self) -> Option<String> {
        OffsetDateTime::now_utc()
            .to_offset(self.tz.offset())
            .format(&Rfc3339)
            .ok()
    }
}

impl FormatTime for LoggerRfc3339 {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        match self.now() {
            Some(ts) => write!(w, "{} ", ts),
            None => write!(w, "<invalid-time> "),
        }
    }
}
