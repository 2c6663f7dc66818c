// SPDX-License-Identifier: Apache-2.0 OR MIT
// Sink capability contract and the bundled output sinks

use crate::{Attr, Record, Severity};
use chrono::SecondsFormat;
use std::io::Write;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Error surfaced by a sink when record delivery fails.
///
/// The handler tree never retries or suppresses these; they propagate
/// unchanged to the caller of `handle`.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O failure writing log destination: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink failure: {0}")]
    Other(String),
}

/// Destination capability for fully-formed log records.
///
/// A sink accepts records and supports incremental refinement: fixed
/// attributes stamped on every record, and named groups that scope the
/// keys of everything added after them. Refinement returns a derived
/// sink and never mutates the original.
pub trait Sink: Send + Sync {
    /// Whether this sink wants records at `severity`.
    ///
    /// Admission through the handler tree is decided by severity cells;
    /// this exists so callers composing sinks directly can skip work.
    fn enabled(&self, severity: Severity) -> bool;

    /// Deliver one record
    fn handle(&self, record: &Record) -> Result<(), SinkError>;

    /// Derived sink with extra fixed attributes
    fn with_attrs(&self, attrs: &[Attr]) -> Arc<dyn Sink>;

    /// Derived sink whose subsequently-added keys are scoped under `group`
    fn with_group(&self, group: &str) -> Arc<dyn Sink>;
}

/// Canonical discard sink.
///
/// This is the "not yet configured" default destination: every record is
/// dropped, refinement is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl NoopSink {
    /// Shared discard sink instance
    pub fn shared() -> Arc<dyn Sink> {
        Arc::new(NoopSink)
    }
}

impl Sink for NoopSink {
    fn enabled(&self, _severity: Severity) -> bool {
        false
    }

    fn handle(&self, _record: &Record) -> Result<(), SinkError> {
        Ok(())
    }

    fn with_attrs(&self, _attrs: &[Attr]) -> Arc<dyn Sink> {
        Arc::new(NoopSink)
    }

    fn with_group(&self, _group: &str) -> Arc<dyn Sink> {
        Arc::new(NoopSink)
    }
}

/// Qualify `key` with the accumulated group prefix ("a.b." + "key")
fn qualified(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}{}", prefix, key)
    }
}

/// Line-oriented text sink: `[SEVERITY] message key=value key=value`
///
/// The writer is shared behind a mutex so derived sinks (and clones)
/// interleave whole lines. Fixed attributes appear before the record's
/// own attributes; group refinement dot-qualifies every key added after
/// it.
pub struct TextSink<W: Write + Send> {
    writer: Arc<Mutex<W>>,
    attrs: Vec<Attr>,
    prefix: String,
}

impl<W: Write + Send> TextSink<W> {
    /// Create a sink owning `writer`
    pub fn new(writer: W) -> Self {
        Self::from_shared(Arc::new(Mutex::new(writer)))
    }

    /// Create a sink over an externally shared writer
    ///
    /// Useful in tests: keep the other handle and inspect what was
    /// written.
    pub fn from_shared(writer: Arc<Mutex<W>>) -> Self {
        Self {
            writer,
            attrs: Vec::new(),
            prefix: String::new(),
        }
    }
}

impl TextSink<std::io::Stdout> {
    /// Sink writing to standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl TextSink<std::io::Stderr> {
    /// Sink writing to standard error
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> Clone for TextSink<W> {
    fn clone(&self) -> Self {
        Self {
            writer: Arc::clone(&self.writer),
            attrs: self.attrs.clone(),
            prefix: self.prefix.clone(),
        }
    }
}

impl<W: Write + Send + 'static> Sink for TextSink<W> {
    fn enabled(&self, _severity: Severity) -> bool {
        true
    }

    fn handle(&self, record: &Record) -> Result<(), SinkError> {
        let mut line = format!("[{}] {}", record.severity, record.message);
        for attr in &self.attrs {
            line.push_str(&format!(" {}", attr));
        }
        for attr in &record.attrs {
            line.push_str(&format!(
                " {}={}",
                qualified(&self.prefix, &attr.key),
                attr.value
            ));
        }

        let mut writer = self.writer.lock().unwrap();
        writeln!(writer, "{}", line)?;
        Ok(())
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Arc<dyn Sink> {
        let mut derived = self.clone();
        for attr in attrs {
            derived.attrs.push(Attr {
                key: qualified(&self.prefix, &attr.key),
                value: attr.value.clone(),
            });
        }
        Arc::new(derived)
    }

    fn with_group(&self, group: &str) -> Arc<dyn Sink> {
        let mut derived = self.clone();
        derived.prefix.push_str(group);
        derived.prefix.push('.');
        Arc::new(derived)
    }
}

/// JSON sink: one object per line with timestamp, level, message and
/// flattened (dot-qualified) attribute keys.
pub struct JsonSink<W: Write + Send> {
    writer: Arc<Mutex<W>>,
    attrs: Vec<Attr>,
    prefix: String,
}

impl<W: Write + Send> JsonSink<W> {
    /// Create a sink owning `writer`
    pub fn new(writer: W) -> Self {
        Self::from_shared(Arc::new(Mutex::new(writer)))
    }

    /// Create a sink over an externally shared writer
    pub fn from_shared(writer: Arc<Mutex<W>>) -> Self {
        Self {
            writer,
            attrs: Vec::new(),
            prefix: String::new(),
        }
    }
}

impl JsonSink<std::io::Stderr> {
    /// Sink writing JSON lines to standard error
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> Clone for JsonSink<W> {
    fn clone(&self) -> Self {
        Self {
            writer: Arc::clone(&self.writer),
            attrs: self.attrs.clone(),
            prefix: self.prefix.clone(),
        }
    }
}

impl<W: Write + Send + 'static> Sink for JsonSink<W> {
    fn enabled(&self, _severity: Severity) -> bool {
        true
    }

    fn handle(&self, record: &Record) -> Result<(), SinkError> {
        let mut object = serde_json::Map::new();
        object.insert(
            "timestamp".to_string(),
            serde_json::Value::String(record.time.to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
        object.insert(
            "level".to_string(),
            serde_json::Value::String(record.severity.as_str().to_string()),
        );
        object.insert(
            "message".to_string(),
            serde_json::Value::String(record.message.clone()),
        );
        for attr in &self.attrs {
            object.insert(
                attr.key.clone(),
                serde_json::to_value(&attr.value).map_err(|e| SinkError::Other(e.to_string()))?,
            );
        }
        for attr in &record.attrs {
            object.insert(
                qualified(&self.prefix, &attr.key),
                serde_json::to_value(&attr.value).map_err(|e| SinkError::Other(e.to_string()))?,
            );
        }

        let mut writer = self.writer.lock().unwrap();
        serde_json::to_writer(&mut *writer, &serde_json::Value::Object(object))
            .map_err(|e| SinkError::Other(e.to_string()))?;
        writeln!(writer)?;
        Ok(())
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Arc<dyn Sink> {
        let mut derived = self.clone();
        for attr in attrs {
            derived.attrs.push(Attr {
                key: qualified(&self.prefix, &attr.key),
                value: attr.value.clone(),
            });
        }
        Arc::new(derived)
    }

    fn with_group(&self, group: &str) -> Arc<dyn Sink> {
        let mut derived = self.clone();
        derived.prefix.push_str(group);
        derived.prefix.push('.');
        Arc::new(derived)
    }
}
