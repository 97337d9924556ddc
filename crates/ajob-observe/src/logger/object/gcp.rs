use std::fmt;

use serde_json::{Map, Value};
use tracing::{Event, Level, Subscriber, field::Field, field::Visit};
use tracing_subscriber::{
    fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields, format::Writer},
    registry::LookupSpan,
};

use crate::logger::object::{LoggerRfc3339, LoggerTimeZone};

/// Keys owned by the formatter; event fields with these names are dropped.
const RESERVED: [&str; 5] = ["severity", "time", "message", "target", "spans"];

/// Event formatter producing one Cloud Logging JSON entry per line.
///
/// ```json
/// {"severity":"WARNING","time":"2025-01-01T00:00:00Z","message":"job not ready","target":"ajob_core::dispatch","attempt":3}
/// ```
///
/// Event fields are flattened into the entry; enclosing spans are listed under `spans`.
#[derive(Debug, Clone, Copy)]
pub struct GcpFormat {
    timer: LoggerRfc3339,
    with_target: bool,
}

impl GcpFormat {
    pub fn new(tz: LoggerTimeZone) -> Self {
        Self {
            timer: LoggerRfc3339::new(tz),
            with_target: true,
        }
    }

    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }
}

/// Maps a tracing level onto the Cloud Logging severity names.
pub fn severity(level: &Level) -> &'static str {
    match *level {
        Level::TRACE | Level::DEBUG => "DEBUG",
        Level::INFO => "INFO",
        Level::WARN => "WARNING",
        Level::ERROR => "ERROR",
    }
}

impl<S, N> FormatEvent<S, N> for GcpFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        let mut entry = Map::new();
        entry.insert("severity".into(), severity(meta.level()).into());
        if let Some(ts) = self.timer.now() {
            entry.insert("time".into(), ts.into());
        }
        entry.insert(
            "message".into(),
            fields.message.take().unwrap_or_default().into(),
        );
        if self.with_target {
            entry.insert("target".into(), meta.target().into());
        }

        if let Some(scope) = ctx.event_scope() {
            let spans: Vec<Value> = scope
                .from_root()
                .map(|span| {
                    let ext = span.extensions();
                    match ext.get::<FormattedFields<N>>() {
                        Some(f) if !f.is_empty() => format!("{}{{{}}}", span.name(), f).into(),
                        _ => span.name().into(),
                    }
                })
                .collect();
            if !spans.is_empty() {
                entry.insert("spans".into(), Value::Array(spans));
            }
        }

        for (key, value) in fields.values {
            if !RESERVED.contains(&key.as_str()) {
                entry.insert(key, value);
            }
        }

        let line = serde_json::to_string(&entry).map_err(|_| fmt::Error)?;
        writeln!(writer, "{line}")
    }
}

#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    values: Map<String, Value>,
}

impl FieldCollector {
    fn put(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.values.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldCollector {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, value.into());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.into());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{value:?}").into());
    }
}
