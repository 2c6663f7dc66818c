// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Integration tests: runtime reconfiguration of the handler tree.
//!
//! These exercise the registry surface end to end: sink and severity
//! swaps becoming visible through arbitrarily derived handlers, sticky
//! per-name overrides, batch semantics, and middleware ordering.

mod common;

use anyhow::Result;
use common::{capture, captured, lines};
use logroute::{
    Attr, JsonSink, Record, Registry, Severity, Sink, SinkError, TextSink, DEFAULT_NAME,
};
use std::collections::HashMap;
use std::io::Read;
use std::sync::{Arc, Mutex};

/// Wrapper sink that prepends a marker to every message, used to make
/// middleware execution order observable.
struct Marker {
    next: Arc<dyn Sink>,
    tag: &'static str,
}

impl Sink for Marker {
    fn enabled(&self, severity: Severity) -> bool {
        self.next.enabled(severity)
    }

    fn handle(&self, record: &Record) -> Result<(), SinkError> {
        let mut marked = record.clone();
        marked.message = format!("{}:{}", self.tag, marked.message);
        self.next.handle(&marked)
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Arc<dyn Sink> {
        Arc::new(Marker {
            next: self.next.with_attrs(attrs),
            tag: self.tag,
        })
    }

    fn with_group(&self, group: &str) -> Arc<dyn Sink> {
        Arc::new(Marker {
            next: self.next.with_group(group),
            tag: self.tag,
        })
    }
}

fn marker(tag: &'static str) -> Arc<dyn logroute::Middleware> {
    Arc::new(move |next: Arc<dyn Sink>| Arc::new(Marker { next, tag }) as Arc<dyn Sink>)
}

#[test]
fn test_swap_visible_through_three_level_derivation() {
    let registry = Registry::new();
    let (old_buffer, old_sink) = capture();
    registry.set_sink("db", old_sink);
    registry.set_level("db", Severity::Debug);

    // Derive three levels deep before the swap
    let deep = registry
        .handler("db")
        .with_attrs(&[Attr::new("shard", 3i64)])
        .with_group("query")
        .with_attrs(&[Attr::new("table", "users")]);

    deep.debug("before");
    assert!(captured(&old_buffer).contains("before"));

    let (new_buffer, new_sink) = capture();
    registry.set_sink("db", new_sink);

    // The very next emission must land in the new sink, refinements intact
    deep.debug("after");
    let output = captured(&new_buffer);
    assert!(output.contains("after"));
    assert!(output.contains("name=db"));
    assert!(output.contains("shard=3"));
    assert!(output.contains("query.table=users"));
    assert!(!captured(&old_buffer).contains("after"));
}

#[test]
fn test_per_name_override_sticky_then_clear_tracks_latest_default() {
    let registry = Registry::new();
    let handler = registry.handler("db");

    let (pinned_buffer, pinned_sink) = capture();
    registry.set_sink("db", pinned_sink);

    // Changing the default must leave the explicit per-name sink alone
    let (first_default_buffer, first_default_sink) = capture();
    registry.set_sink(DEFAULT_NAME, first_default_sink);
    handler.info("pinned");
    assert!(captured(&pinned_buffer).contains("pinned"));
    assert!(!captured(&first_default_buffer).contains("pinned"));

    // Change the default again, then clear: the name must pick up the
    // latest default, not the one in effect when it was overridden
    let (second_default_buffer, second_default_sink) = capture();
    registry.set_sink(DEFAULT_NAME, second_default_sink);
    registry.clear_sink("db");

    handler.info("released");
    assert!(captured(&second_default_buffer).contains("released"));
    assert!(!captured(&first_default_buffer).contains("released"));
    assert!(!captured(&pinned_buffer).contains("released"));
}

#[test]
fn test_batch_sink_replace_semantics() {
    let registry = Registry::new();
    let alpha = registry.handler("alpha");
    let beta = registry.handler("beta");
    let gamma = registry.handler("gamma");

    let (_b, stale) = capture();
    registry.set_sink("beta", Arc::clone(&stale));
    registry.set_sink("gamma", stale);

    let (alpha_buffer, alpha_sink) = capture();
    let (beta_buffer, beta_sink) = capture();
    let (default_buffer, default_sink) = capture();

    let mut batch: HashMap<String, Arc<dyn Sink>> = HashMap::new();
    batch.insert("alpha".to_string(), alpha_sink);
    batch.insert("beta".to_string(), beta_sink);
    batch.insert(DEFAULT_NAME.to_string(), default_sink);
    batch.insert("delta".to_string(), capture().1);
    registry.set_sinks(batch, true);

    alpha.info("to alpha");
    beta.info("to beta");
    // gamma's old override was not in the map: replace resets it
    gamma.info("to default");

    assert!(captured(&alpha_buffer).contains("to alpha"));
    assert!(captured(&beta_buffer).contains("to beta"));
    assert!(captured(&default_buffer).contains("to default"));

    // The map also created "delta" eagerly
    let delta = registry.handler("delta");
    delta.info("created by batch");
    assert!(!captured(&default_buffer).contains("created by batch"));
}

#[test]
fn test_middleware_global_wraps_local() {
    let registry = Registry::new();
    let (buffer, sink) = capture();
    registry.set_sink("svc", sink);

    registry.append_middleware(DEFAULT_NAME, marker("G"));
    registry.append_middleware("svc", marker("L"));

    registry.handler("svc").info("msg");

    // Global runs first on the way in, so the local marker sees (and
    // stacks onto) the global marker's output
    let line = &lines(&buffer)[0];
    assert!(line.contains("L:G:msg"), "got: {line}");
}

#[test]
fn test_resolve_identity_memoized_until_change() {
    let registry = Registry::new();
    let handler = registry
        .handler("svc")
        .with_attrs(&[Attr::new("k", "v")]);

    let first = handler.sink();
    let second = handler.sink();
    assert!(Arc::ptr_eq(&first, &second), "memo must be reused");

    let (_buffer, replacement) = capture();
    registry.set_sink("svc", replacement);

    let third = handler.sink();
    assert!(!Arc::ptr_eq(&second, &third), "swap must invalidate memo");
    assert!(Arc::ptr_eq(&third, &handler.sink()));
}

#[test]
fn test_severity_batch_with_default_and_replace() {
    let registry = Registry::new();
    let api = registry.handler("api");
    let db = registry.handler("db");
    registry.set_level("api", Severity::Debug);

    let mut batch = HashMap::new();
    batch.insert(DEFAULT_NAME.to_string(), Severity::Warning);
    batch.insert("db".to_string(), Severity::Debug);
    registry.set_levels(batch, true);

    assert!(db.enabled(Severity::Debug));
    // api lost its override and follows the new Warning default
    assert!(!api.enabled(Severity::Debug));
    assert!(!api.enabled(Severity::Info));
    assert!(api.enabled(Severity::Warning));
}

#[test]
fn test_end_to_end_db_configured_api_inherits_defaults() {
    let registry = Registry::new();

    let db = registry.handler("db");
    let api = registry.handler("api");

    registry.set_level("db", Severity::Debug);
    let (text_buffer, text_sink) = capture();
    registry.set_sink("db", text_sink);

    db.debug("cache warmed");
    api.debug("should be suppressed");
    api.info("should be discarded");

    let output = captured(&text_buffer);
    assert!(output.contains("cache warmed"));
    assert!(output.contains("name=db"));
    assert!(!output.contains("suppressed"));
    assert!(!output.contains("discarded"));

    // api inherits the Info default threshold and the discard sink
    assert!(!api.enabled(Severity::Debug));
    assert!(api.enabled(Severity::Info));
}

#[test]
fn test_json_sink_through_registry() -> Result<()> {
    let registry = Registry::new();
    let buffer = Arc::new(Mutex::new(Vec::new()));
    registry.set_sink("db", Arc::new(JsonSink::from_shared(Arc::clone(&buffer))));

    registry
        .handler("db")
        .with_group("conn")
        .log_kv(Severity::Warning, "Slow query", &[Attr::new("ms", 250i64)]);

    let raw = String::from_utf8(buffer.lock().unwrap().clone())?;
    let parsed: serde_json::Value = serde_json::from_str(raw.trim_end())?;
    assert_eq!(parsed["level"], "WARNING");
    assert_eq!(parsed["message"], "Slow query");
    assert_eq!(parsed["name"], "db");
    assert_eq!(parsed["conn.ms"], 250);
    Ok(())
}

#[test]
fn test_text_sink_to_file() -> Result<()> {
    let tmp = tempfile::NamedTempFile::new()?;
    let mut reader = tmp.reopen()?;

    let registry = Registry::new();
    registry.set_sink("audit", Arc::new(TextSink::new(tmp)));
    registry.handler("audit").warning("disk nearly full");

    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    assert!(contents.contains("[WARNING] disk nearly full name=audit"));
    Ok(())
}
