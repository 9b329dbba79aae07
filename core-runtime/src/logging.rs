//! Structured logging for the gateway.
//!
//! [`init_logging`] installs a `tracing-subscriber` registry with an
//! `EnvFilter`, one formatting layer chosen by [`LogFormat`], and a layer
//! that mirrors every surviving event to the host's [`LoggerSink`]
//! (Logcat, OSLog, a desktop console).
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//! use bridge_traits::logging::LogLevel;
//!
//! init_logging(
//!     LoggingConfig::default()
//!         .with_format(LogFormat::Compact)
//!         .with_level(LogLevel::Debug)
//!         .with_logger_sink(host_logger),
//! )?;
//! ```
//!
//! Fields forwarded to the host pass through [`redact_if_sensitive`] unless
//! redaction is switched off. Adapters log local file paths through
//! [`strip_path`] themselves.

use crate::error::{Error, Result};

use bridge_traits::logging::{LogEntry, LogLevel, LoggerSink};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    filter::EnvFilter,
    layer::{Context, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
    Layer, Registry,
};

/// Crates whose events pass at the configured level. Everything else is
/// held at `warn`.
const GATEWAY_TARGETS: &[&str] = &[
    "core_runtime",
    "core_auth",
    "core_firestore",
    "core_storage",
    "core_service",
    "bridge_desktop",
];

const SENSITIVE_KEYS: &[&str] = &[
    "token",
    "password",
    "secret",
    "credential",
    "api_key",
    "authorization",
];

const REDACTED: &str = "[REDACTED]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, coloured. Debug builds default to this.
    Pretty,
    /// One JSON object per line. Release builds default to this.
    Json,
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    pub redact_pii: bool,
    /// Full `EnvFilter` directive string. Replaces the per-crate default.
    pub filter: Option<String>,
    pub logger_sink: Option<Arc<dyn LoggerSink>>,
    /// Print thread names, which shows whether delivery ran on the host thread.
    pub thread_names: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            redact_pii: true,
            filter: None,
            logger_sink: None,
            thread_names: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_pii_redaction(mut self, redact: bool) -> Self {
        self.redact_pii = redact;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    pub fn with_thread_names(mut self, show: bool) -> Self {
        self.thread_names = show;
        self
    }
}

/// Install the global subscriber. Call once at plugin load.
///
/// # Errors
///
/// `Error::Config` when the filter does not parse or a global subscriber is
/// already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config)?;
    let host_layer = HostLogLayer::new(config.logger_sink.clone(), config.redact_pii);

    tracing_subscriber::registry()
        .with(format_layer(&config))
        .with(filter)
        .with(host_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
}

fn format_layer(config: &LoggingConfig) -> Box<dyn Layer<Registry> + Send + Sync> {
    let base = tracing_subscriber::fmt::layer().with_thread_names(config.thread_names);
    match config.format {
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Json => base.json().flatten_event(true).boxed(),
        LogFormat::Compact => base.compact().boxed(),
    }
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let directives = match &config.filter {
        Some(custom) => custom.clone(),
        None => {
            let level = config.level.as_str().to_ascii_lowercase();
            std::iter::once("warn".to_string())
                .chain(GATEWAY_TARGETS.iter().map(|t| format!("{}={}", t, level)))
                .collect::<Vec<_>>()
                .join(",")
        }
    };

    EnvFilter::try_new(directives).map_err(|e| Error::Config(format!("Invalid log filter: {}", e)))
}

fn from_tracing_level(level: &tracing::Level) -> LogLevel {
    match *level {
        tracing::Level::TRACE => LogLevel::Trace,
        tracing::Level::DEBUG => LogLevel::Debug,
        tracing::Level::INFO => LogLevel::Info,
        tracing::Level::WARN => LogLevel::Warn,
        tracing::Level::ERROR => LogLevel::Error,
    }
}

/// Mirrors events into the host's logger.
struct HostLogLayer {
    sink: Option<Arc<dyn LoggerSink>>,
    redact: bool,
}

impl HostLogLayer {
    fn new(sink: Option<Arc<dyn LoggerSink>>, redact: bool) -> Self {
        Self { sink, redact }
    }

    fn entry_for<S>(&self, event: &Event<'_>, ctx: &Context<'_, S>, level: LogLevel) -> LogEntry
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let metadata = event.metadata();
        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        let message = fields
            .message
            .take()
            .unwrap_or_else(|| metadata.name().to_string());
        let mut entry = LogEntry::new(level, metadata.target(), message);

        for (key, value) in fields.values {
            let value = if self.redact {
                redact_if_sensitive(&key, &value)
            } else {
                value
            };
            entry = entry.with_field(key, value);
        }
        match ctx.lookup_current() {
            Some(span) => entry.with_span_id(span.name()),
            None => entry,
        }
    }
}

impl<S> Layer<S> for HostLogLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let Some(sink) = &self.sink else {
            return;
        };
        let level = from_tracing_level(event.metadata().level());
        if level < sink.min_level() {
            return;
        }

        let entry = self.entry_for(event, &ctx, level);
        let sink = Arc::clone(sink);
        let deliver = async move {
            if let Err(err) = sink.log(entry).await {
                eprintln!("host logger rejected entry: {}", err);
            }
        };

        // Events raised on the host thread have no runtime; deliver inline there.
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(deliver);
            }
            Err(_) => futures::executor::block_on(deliver),
        }
    }
}

#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    values: HashMap<String, String>,
}

impl FieldCollector {
    fn insert(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = Some(value),
            name => {
                self.values.insert(name.to_string(), value);
            }
        }
    }
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, format!("{:?}", value));
    }
}

/// Mask a field value before it leaves the process.
///
/// Credential-like keys are replaced wholesale. Anything shaped like an
/// e-mail address keeps its first character.
///
/// ```
/// use core_runtime::logging::redact_if_sensitive;
///
/// assert_eq!(redact_if_sensitive("password", "hunter2"), "[REDACTED]");
/// assert_eq!(redact_if_sensitive("email", "ada@example.com"), "a***@[REDACTED]");
/// assert_eq!(redact_if_sensitive("collection", "scores"), "scores");
/// ```
pub fn redact_if_sensitive(field_name: &str, value: &str) -> String {
    let key = field_name.to_ascii_lowercase();
    if SENSITIVE_KEYS.iter().any(|k| key.contains(k)) {
        return REDACTED.to_string();
    }
    match value.split_once('@') {
        Some((local, domain)) if domain.contains('.') => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, REDACTED)
        }
        _ => value.to_string(),
    }
}

/// Final path segment, for either separator.
///
/// ```
/// use core_runtime::logging::strip_path;
///
/// assert_eq!(strip_path("/data/user/0/files/avatar.png"), "avatar.png");
/// ```
pub fn strip_path(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as SinkResult;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingLogger {
        entries: Mutex<Vec<LogEntry>>,
    }

    #[async_trait]
    impl LoggerSink for RecordingLogger {
        async fn log(&self, entry: LogEntry) -> SinkResult<()> {
            self.entries.lock().push(entry);
            Ok(())
        }

        fn min_level(&self) -> LogLevel {
            LogLevel::Trace
        }
    }

    fn with_host_layer(redact: bool, emit: impl FnOnce()) -> Vec<LogEntry> {
        let logger = Arc::new(RecordingLogger::default());
        let sink: Arc<dyn LoggerSink> = logger.clone();
        let subscriber = tracing_subscriber::registry().with(HostLogLayer::new(Some(sink), redact));
        tracing::subscriber::with_default(subscriber, emit);
        let entries = logger.entries.lock().clone();
        entries
    }

    #[test]
    fn test_default_filter_covers_gateway_crates() {
        let filter = build_filter(&LoggingConfig::default().with_level(LogLevel::Debug)).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("core_auth=debug"));
        assert!(rendered.contains("core_storage=debug"));
        assert!(rendered.contains("bridge_desktop=debug"));
    }

    #[test]
    fn test_custom_filter_replaces_default() {
        let config = LoggingConfig::default().with_filter("core_firestore=trace");
        let rendered = build_filter(&config).unwrap().to_string();
        assert!(rendered.contains("core_firestore=trace"));
        assert!(!rendered.contains("core_auth"));
    }

    #[test]
    fn test_host_layer_forwards_message_and_fields() {
        let entries = with_host_layer(false, || {
            tracing::info!(target: "core_firestore", collection = "scores", attempt = 2, "Document written");
        });

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].target, "core_firestore");
        assert_eq!(entries[0].message, "Document written");
        assert_eq!(entries[0].fields.get("collection"), Some(&"scores".to_string()));
        assert_eq!(entries[0].fields.get("attempt"), Some(&"2".to_string()));
    }

    #[test]
    fn test_host_layer_redacts_credentials_and_emails() {
        let entries = with_host_layer(true, || {
            tracing::warn!(email = "ada@example.com", id_token = "eyJhbGci", "Sign-in failed");
        });

        assert_eq!(entries[0].fields.get("email"), Some(&"a***@[REDACTED]".to_string()));
        assert_eq!(entries[0].fields.get("id_token"), Some(&REDACTED.to_string()));
    }

    #[test]
    fn test_host_layer_records_enclosing_span() {
        let entries = with_host_layer(false, || {
            tracing::info!("outside");
            let span = tracing::info_span!("blob_operation", operation = "list");
            let _entered = span.enter();
            tracing::info!("inside");
        });

        assert_eq!(entries[0].span_id, None);
        assert_eq!(entries[1].span_id.as_deref(), Some("blob_operation"));
    }

    #[test]
    fn test_redaction_leaves_plain_values() {
        assert_eq!(redact_if_sensitive("document_id", "doc-1"), "doc-1");
        assert_eq!(redact_if_sensitive("path", "images/a.png"), "images/a.png");
        // An '@' without a dotted domain is not an address.
        assert_eq!(redact_if_sensitive("handle", "@ada"), "@ada");
    }

    #[test]
    fn test_strip_path_handles_both_separators() {
        assert_eq!(strip_path("/home/user/saves/slot1.bin"), "slot1.bin");
        assert_eq!(strip_path("C:\\Users\\Ada\\saves\\slot1.bin"), "slot1.bin");
        assert_eq!(strip_path("slot1.bin"), "slot1.bin");
        assert_eq!(strip_path("/var/log/"), "");
    }
}
