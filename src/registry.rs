// SPDX-License-Identifier: Apache-2.0 OR MIT
// Registry: named configurations, defaults, and runtime reconfiguration

use crate::config::Config;
use crate::{Handler, Middleware, NoopSink, Severity, Sink};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Reserved name denoting the registry defaults.
///
/// As a write target it updates the global default and propagates to
/// every configuration still tracking it. It is not a legal per-name
/// key: batch maps treat it as the default entry, and `clear_sink` /
/// `clear_level` ignore it.
pub const DEFAULT_NAME: &str = "*";

struct Inner {
    default_sink: Arc<dyn Sink>,
    default_severity: Severity,
    global_middleware: Vec<Arc<dyn Middleware>>,
    configs: HashMap<String, Config>,
}

impl Inner {
    /// Get-or-create the configuration for `name`, seeding new ones
    /// from the current defaults
    fn ensure(&mut self, name: &str) -> &mut Config {
        if !self.configs.contains_key(name) {
            let config = Config::new(
                name.to_string(),
                Arc::clone(&self.default_sink),
                self.default_severity,
                self.global_middleware.clone(),
            );
            self.configs.insert(name.to_string(), config);
        }
        self.configs.get_mut(name).unwrap()
    }
}

/// Controller for a tree of named log handlers.
///
/// The registry owns the default sink, severity and middleware, plus one
/// configuration per logical name, created lazily on first lookup and
/// never discarded. All mutation is serialized by one mutex, held for
/// the full duration of an operation so batch calls are atomic with
/// respect to concurrent `handler` lookups. The logging hot path never
/// takes this mutex: handlers read each configuration's severity cell
/// and published delegate through atomics only.
///
/// A freshly constructed registry discards everything: default sink is
/// the no-op sink, default severity is `Info`.
pub struct Registry {
    inner: Mutex<Inner>,
}

impl Registry {
    /// Registry with the discard-until-configured defaults
    pub fn new() -> Self {
        Self::with_defaults(NoopSink::shared(), Severity::Info)
    }

    /// Registry with explicit default sink and severity
    pub fn with_defaults(sink: Arc<dyn Sink>, severity: Severity) -> Self {
        Self {
            inner: Mutex::new(Inner {
                default_sink: sink,
                default_severity: severity,
                global_middleware: Vec::new(),
                configs: HashMap::new(),
            }),
        }
    }

    /// Handler for `name`, creating its configuration on first use.
    ///
    /// The returned handler carries no refinements of its own; the name
    /// attribute is already baked into the configuration's delegate.
    pub fn handler(&self, name: &str) -> Handler {
        let mut inner = self.inner.lock().unwrap();
        let config = inner.ensure(name);
        Handler::new(config.slot(), config.cell())
    }

    /// Install a sink for `name`, or (for [`DEFAULT_NAME`]) replace the
    /// default sink and propagate it to every configuration not
    /// explicitly overridden.
    pub fn set_sink(&self, name: &str, sink: Arc<dyn Sink>) {
        let mut inner = self.inner.lock().unwrap();
        if name == DEFAULT_NAME {
            inner.default_sink = Arc::clone(&sink);
            for config in inner.configs.values_mut() {
                config.set_sink(Arc::clone(&sink), true, false);
            }
        } else {
            inner.ensure(name).set_sink(sink, false, false);
        }
    }

    /// Batch sink installation under one critical section.
    ///
    /// A [`DEFAULT_NAME`] entry is applied first, exactly like
    /// `set_sink(DEFAULT_NAME, ..)`. Remaining entries become explicit
    /// per-name sinks, creating configurations as needed. With `replace`
    /// set, every existing configuration absent from the map is reset to
    /// tracking the default, clearing any prior override.
    pub fn set_sinks(&self, sinks: HashMap<String, Arc<dyn Sink>>, replace: bool) {
        let mut sinks = sinks;
        let mut inner = self.inner.lock().unwrap();

        if let Some(default) = sinks.remove(DEFAULT_NAME) {
            inner.default_sink = Arc::clone(&default);
            for config in inner.configs.values_mut() {
                config.set_sink(Arc::clone(&default), true, false);
            }
        }

        let default_sink = Arc::clone(&inner.default_sink);
        for (name, config) in inner.configs.iter_mut() {
            match sinks.remove(name.as_str()) {
                Some(sink) => config.set_sink(sink, false, false),
                None if replace => {
                    config.set_sink(Arc::clone(&default_sink), true, true);
                }
                None => {}
            }
        }

        for (name, sink) in sinks {
            inner.ensure(&name).set_sink(sink, false, false);
        }
    }

    /// Reset one name's sink back to tracking the default. A no-op for
    /// [`DEFAULT_NAME`] and for names never configured.
    pub fn clear_sink(&self, name: &str) {
        if name == DEFAULT_NAME {
            return;
        }
        let mut inner = self.inner.lock().unwrap();
        let default_sink = Arc::clone(&inner.default_sink);
        if let Some(config) = inner.configs.get_mut(name) {
            config.set_sink(default_sink, true, true);
        }
    }

    /// Install a severity threshold for `name`, or (for
    /// [`DEFAULT_NAME`]) replace the default severity and propagate it
    /// to every configuration not explicitly overridden.
    pub fn set_level(&self, name: &str, level: Severity) {
        let mut inner = self.inner.lock().unwrap();
        if name == DEFAULT_NAME {
            inner.default_severity = level;
            for config in inner.configs.values_mut() {
                config.set_severity(level, true, false);
            }
        } else {
            inner.ensure(name).set_severity(level, false, false);
        }
    }

    /// Batch severity installation; same shape as [`Registry::set_sinks`]
    pub fn set_levels(&self, levels: HashMap<String, Severity>, replace: bool) {
        let mut levels = levels;
        let mut inner = self.inner.lock().unwrap();

        if let Some(default) = levels.remove(DEFAULT_NAME) {
            inner.default_severity = default;
            for config in inner.configs.values_mut() {
                config.set_severity(default, true, false);
            }
        }

        let default_severity = inner.default_severity;
        for (name, config) in inner.configs.iter_mut() {
            match levels.remove(name.as_str()) {
                Some(level) => config.set_severity(level, false, false),
                None if replace => {
                    config.set_severity(default_severity, true, true);
                }
                None => {}
            }
        }

        for (name, level) in levels {
            inner.ensure(&name).set_severity(level, false, false);
        }
    }

    /// Reset one name's severity back to tracking the default. A no-op
    /// for [`DEFAULT_NAME`] and for names never configured.
    pub fn clear_level(&self, name: &str) {
        if name == DEFAULT_NAME {
            return;
        }
        let mut inner = self.inner.lock().unwrap();
        let default_severity = inner.default_severity;
        if let Some(config) = inner.configs.get_mut(name) {
            config.set_severity(default_severity, true, true);
        }
    }

    /// Append middleware for `name`, or (for [`DEFAULT_NAME`]) append to
    /// the global chain and re-snapshot it into every configuration.
    pub fn append_middleware(&self, name: &str, middleware: Arc<dyn Middleware>) {
        let mut inner = self.inner.lock().unwrap();
        if name == DEFAULT_NAME {
            inner.global_middleware.push(middleware);
            let snapshot = inner.global_middleware.clone();
            for config in inner.configs.values_mut() {
                config.set_middleware(snapshot.clone(), false, Vec::new());
            }
        } else {
            let snapshot = inner.global_middleware.clone();
            inner
                .ensure(name)
                .set_middleware(snapshot, false, vec![middleware]);
        }
    }

    /// Batch middleware installation under one critical section.
    ///
    /// A [`DEFAULT_NAME`] entry replaces the global chain. Every
    /// existing configuration receives the fresh global snapshot; with
    /// `replace` set its local chain is replaced by the map's entry (or
    /// emptied if absent), otherwise the entry is appended.
    pub fn set_middleware(
        &self,
        middleware: HashMap<String, Vec<Arc<dyn Middleware>>>,
        replace: bool,
    ) {
        let mut middleware = middleware;
        let mut inner = self.inner.lock().unwrap();

        if let Some(global) = middleware.remove(DEFAULT_NAME) {
            inner.global_middleware = global;
        }

        let snapshot = inner.global_middleware.clone();
        for (name, config) in inner.configs.iter_mut() {
            let additions = middleware.remove(name.as_str()).unwrap_or_default();
            config.set_middleware(snapshot.clone(), replace, additions);
        }

        for (name, additions) in middleware {
            inner
                .ensure(&name)
                .set_middleware(snapshot.clone(), replace, additions);
        }
    }

    /// Current default severity
    pub fn default_severity(&self) -> Severity {
        self.inner.lock().unwrap().default_severity
    }

    /// Current default sink
    pub fn default_sink(&self) -> Arc<dyn Sink> {
        Arc::clone(&self.inner.lock().unwrap().default_sink)
    }

    /// Current global middleware chain
    pub fn default_middleware(&self) -> Vec<Arc<dyn Middleware>> {
        self.inner.lock().unwrap().global_middleware.clone()
    }

    /// Effective raw sink for `name` (before middleware and the name
    /// attribute): its configured sink if the name exists, otherwise
    /// the default
    pub fn sink(&self, name: &str) -> Arc<dyn Sink> {
        let inner = self.inner.lock().unwrap();
        inner
            .configs
            .get(name)
            .map(|config| config.sink())
            .unwrap_or_else(|| Arc::clone(&inner.default_sink))
    }

    /// Local middleware chain for `name` (empty if none configured)
    pub fn middleware(&self, name: &str) -> Vec<Arc<dyn Middleware>> {
        let inner = self.inner.lock().unwrap();
        inner
            .configs
            .get(name)
            .map(|config| config.local_middleware())
            .unwrap_or_default()
    }

    /// Effective severity for `name`: its configured threshold if the
    /// name exists, otherwise the default
    pub fn level(&self, name: &str) -> Severity {
        let inner = self.inner.lock().unwrap();
        inner
            .configs
            .get(name)
            .map(|config| config.cell().get())
            .unwrap_or(inner.default_severity)
    }

    /// All names holding an explicit severity override
    pub fn level_overrides(&self) -> HashMap<String, Severity> {
        let inner = self.inner.lock().unwrap();
        inner
            .configs
            .iter()
            .filter(|(_, config)| config.custom_severity())
            .map(|(name, config)| (name.clone(), config.cell().get()))
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: Lazy<RwLock<Arc<Registry>>> =
    Lazy::new(|| RwLock::new(Arc::new(Registry::new())));

/// The process-wide default registry.
///
/// Constructed on first use in the discard-everything state; package
/// level handlers created before any configuration call therefore log
/// nowhere until an operator installs a sink.
pub fn global() -> Arc<Registry> {
    Arc::clone(&GLOBAL.read().unwrap())
}

/// Replace the process-wide registry, returning the previous one.
///
/// Handlers already created keep following the registry they came from;
/// tests use this to install a fresh registry without cross-talk.
pub fn set_global(registry: Arc<Registry>) -> Arc<Registry> {
    std::mem::replace(&mut *GLOBAL.write().unwrap(), registry)
}

/// Handler for `name` from the process-wide registry
pub fn handler(name: &str) -> Handler {
    global().handler(name)
}
