// SPDX-License-Identifier: Apache-2.0 OR MIT
// Per-name configuration: severity cell, sink, middleware, published delegate

use crate::middleware::compose;
use crate::{Attr, Middleware, NoopSink, Severity, SeverityCell, Sink};
use arc_swap::ArcSwap;
use std::sync::Arc;

/// One published generation of a configuration's composed sink.
///
/// The extra wrapper keeps the swapped pointer one machine word wide (a
/// fat `Arc<dyn Sink>` cannot live in the atomic slot directly), and its
/// allocation identity is what handlers memoize against: every rebuild
/// publishes a fresh `Delegate`, so identity change and delegate change
/// coincide exactly.
pub(crate) struct Delegate {
    pub(crate) sink: Arc<dyn Sink>,
}

/// Atomically published delegate, shared with every handler bound to
/// the owning configuration. Hot-path reads are one atomic load.
pub(crate) type DelegateSlot = ArcSwap<Delegate>;

/// Mutable per-name state owned by the registry.
///
/// All mutation happens with the registry mutex held; the published
/// delegate is the only field read outside it. The delegate is always a
/// pure function of the other fields: global middleware wrapping local
/// middleware wrapping the raw sink, with the name attribute attached
/// outermost. Any change to those fields recomputes and republishes it.
pub(crate) struct Config {
    name: String,
    cell: Arc<SeverityCell>,
    sink: Arc<dyn Sink>,
    custom_sink: bool,
    custom_severity: bool,
    local_middleware: Vec<Arc<dyn Middleware>>,
    global_middleware: Vec<Arc<dyn Middleware>>,
    delegate: Arc<DelegateSlot>,
}

impl Config {
    /// Create a configuration seeded from the registry defaults
    pub(crate) fn new(
        name: String,
        default_sink: Arc<dyn Sink>,
        default_severity: Severity,
        global_middleware: Vec<Arc<dyn Middleware>>,
    ) -> Self {
        let mut config = Self {
            name,
            cell: Arc::new(SeverityCell::new(default_severity)),
            sink: default_sink,
            custom_sink: false,
            custom_severity: false,
            local_middleware: Vec::new(),
            global_middleware,
            delegate: Arc::new(ArcSwap::new(Arc::new(Delegate {
                sink: NoopSink::shared(),
            }))),
        };
        config.rebuild();
        config
    }

    pub(crate) fn cell(&self) -> Arc<SeverityCell> {
        Arc::clone(&self.cell)
    }

    pub(crate) fn slot(&self) -> Arc<DelegateSlot> {
        Arc::clone(&self.delegate)
    }

    pub(crate) fn custom_severity(&self) -> bool {
        self.custom_severity
    }

    pub(crate) fn sink(&self) -> Arc<dyn Sink> {
        Arc::clone(&self.sink)
    }

    pub(crate) fn local_middleware(&self) -> Vec<Arc<dyn Middleware>> {
        self.local_middleware.clone()
    }

    /// Install a sink.
    ///
    /// `default_propagation` marks the call as a global-default change
    /// fanning out; an explicit per-name sink is sticky against that
    /// unless `force` is set. An explicit call (default_propagation =
    /// false) always lands and marks the sink as explicitly set.
    pub(crate) fn set_sink(&mut self, sink: Arc<dyn Sink>, default_propagation: bool, force: bool) {
        if default_propagation && self.custom_sink && !force {
            return;
        }
        self.custom_sink = !default_propagation;
        self.sink = sink;
        self.rebuild();
    }

    /// Install a severity threshold. Same stickiness rule as `set_sink`;
    /// the cell is written directly, no delegate rebuild needed.
    pub(crate) fn set_severity(&mut self, level: Severity, default_propagation: bool, force: bool) {
        if default_propagation && self.custom_severity && !force {
            return;
        }
        self.custom_severity = !default_propagation;
        self.cell.set(level);
    }

    /// Replace the global-middleware snapshot and update the local list
    /// (`force` replaces it, otherwise `additions` are appended).
    pub(crate) fn set_middleware(
        &mut self,
        global_snapshot: Vec<Arc<dyn Middleware>>,
        force: bool,
        additions: Vec<Arc<dyn Middleware>>,
    ) {
        self.global_middleware = global_snapshot;
        if force {
            self.local_middleware = additions;
        } else {
            self.local_middleware.extend(additions);
        }
        self.rebuild();
    }

    /// Recompose and publish the delegate with a single atomic store
    fn rebuild(&mut self) {
        let composed = compose(&self.local_middleware, Arc::clone(&self.sink));
        let composed = compose(&self.global_middleware, composed);
        let named = composed.with_attrs(&[Attr::new("name", self.name.as_str())]);
        self.delegate.store(Arc::new(Delegate { sink: named }));
    }
}
