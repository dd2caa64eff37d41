//! Logging collaborator.
//!
//! Repositories and services receive a [`SharedLogger`] at construction and never
//! reach for ambient logger state themselves. Production wiring uses
//! [`TracingLogger`]; tests inject a [`RecordingLogger`] and assert on what was
//! (or was not) logged.

use std::fmt;
use std::sync::{Arc, Mutex};

/// Severity of a log record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Structured logging sink.
///
/// `fields` are key/value pairs rendered by the implementation; keys are static
/// so they stay greppable across log output.
pub trait CatalogLogger: Send + Sync + fmt::Debug {
    fn log(&self, level: LogLevel, message: &str, fields: &[(&'static str, String)]);

    fn debug(&self, message: &str, fields: &[(&'static str, String)]) {
        self.log(LogLevel::Debug, message, fields)
    }

    fn info(&self, message: &str, fields: &[(&'static str, String)]) {
        self.log(LogLevel::Info, message, fields)
    }

    fn warn(&self, message: &str, fields: &[(&'static str, String)]) {
        self.log(LogLevel::Warn, message, fields)
    }

    fn error(&self, message: &str, fields: &[(&'static str, String)]) {
        self.log(LogLevel::Error, message, fields)
    }
}

/// Shared handle passed to each repository/service.
pub type SharedLogger = Arc<dyn CatalogLogger>;

/// Logger that forwards records to the process `tracing` subscriber.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    component: &'static str,
}

impl TracingLogger {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn shared(component: &'static str) -> SharedLogger {
        Arc::new(Self::new(component))
    }
}

fn render_fields(fields: &[(&'static str, String)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(" ")
}

impl CatalogLogger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str, fields: &[(&'static str, String)]) {
        let component = self.component;
        let fields = render_fields(fields);
        match level {
            LogLevel::Debug => ::tracing::debug!(component, fields = %fields, "{message}"),
            LogLevel::Info => ::tracing::info!(component, fields = %fields, "{message}"),
            LogLevel::Warn => ::tracing::warn!(component, fields = %fields, "{message}"),
            LogLevel::Error => ::tracing::error!(component, fields = %fields, "{message}"),
        }
    }
}

/// A captured log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogRecord {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// In-memory logger for tests/dev.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(_) => vec![],
        }
    }

    pub fn at_level(&self, level: LogLevel) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.level == level)
            .collect()
    }
}

impl CatalogLogger for RecordingLogger {
    fn log(&self, level: LogLevel, message: &str, fields: &[(&'static str, String)]) {
        if let Ok(mut records) = self.records.lock() {
            records.push(LogRecord {
                level,
                message: message.to_string(),
                fields: fields.to_vec(),
            });
        }
    }
}
