// SPDX-License-Identifier: Apache-2.0 OR MIT
// Handler: the application-facing emitter with memoized derivation

use crate::config::{Delegate, DelegateSlot};
use crate::{Attr, Record, Severity, SeverityCell, Sink, SinkError};
use arc_swap::ArcSwapOption;
use std::sync::Arc;

/// One pending derivation step, replayed onto the live delegate
#[derive(Clone)]
enum Refinement {
    Attrs(Vec<Attr>),
    Group(String),
}

impl Refinement {
    fn apply(&self, sink: Arc<dyn Sink>) -> Arc<dyn Sink> {
        match self {
            Refinement::Attrs(attrs) => sink.with_attrs(attrs),
            Refinement::Group(group) => sink.with_group(group),
        }
    }
}

/// Cached resolution: the delegate identity last seen and the refined
/// sink built from it. Valid exactly while the published delegate is
/// still that same `Arc`.
struct Memo {
    basis: Arc<Delegate>,
    refined: Arc<dyn Sink>,
}

/// Log emitter bound to a named configuration.
///
/// A handler holds references to where the registry publishes the
/// configuration's composed delegate and severity cell, plus its own
/// list of pending refinements accumulated through [`Handler::with_attrs`]
/// and [`Handler::with_group`]. It never registers itself anywhere: on
/// each emission it checks whether the delegate identity it last
/// resolved against is still current and replays its refinements onto
/// the fresh delegate only when that changed. Configuration swaps made
/// through the registry therefore become visible to every handler -
/// however deeply derived - on its very next use, with no notification
/// machinery and nothing for the registry to track or clean up.
pub struct Handler {
    slot: Arc<DelegateSlot>,
    cell: Arc<SeverityCell>,
    refinements: Arc<[Refinement]>,
    memo: ArcSwapOption<Memo>,
}

impl Handler {
    pub(crate) fn new(slot: Arc<DelegateSlot>, cell: Arc<SeverityCell>) -> Self {
        Self {
            slot,
            cell,
            refinements: Arc::from(Vec::new()),
            memo: ArcSwapOption::empty(),
        }
    }

    /// Whether a record at `severity` would currently be admitted.
    ///
    /// Always a fresh read of the shared severity cell, never memoized:
    /// thresholds change far more often, and far more cheaply, than the
    /// sink chain.
    #[inline]
    pub fn enabled(&self, severity: Severity) -> bool {
        severity.passes(self.cell.get())
    }

    /// Derived handler with extra fixed attributes.
    ///
    /// O(1): records the refinement, shares the delegate slot and
    /// severity cell, performs no sink work until the next emission.
    pub fn with_attrs(&self, attrs: &[Attr]) -> Handler {
        self.derive(Refinement::Attrs(attrs.to_vec()))
    }

    /// Derived handler whose subsequently-added keys are scoped under
    /// `group`. Same cost model as [`Handler::with_attrs`].
    pub fn with_group(&self, group: &str) -> Handler {
        self.derive(Refinement::Group(group.to_string()))
    }

    fn derive(&self, refinement: Refinement) -> Handler {
        let mut refinements = self.refinements.to_vec();
        refinements.push(refinement);
        Handler {
            slot: Arc::clone(&self.slot),
            cell: Arc::clone(&self.cell),
            refinements: Arc::from(refinements),
            memo: ArcSwapOption::empty(),
        }
    }

    /// The currently effective sink: the live delegate with this
    /// handler's refinements replayed onto it.
    ///
    /// Memoized by delegate identity. Concurrent calls racing a
    /// reconfiguration may rebuild redundantly; the rebuild is pure, so
    /// last writer wins harmlessly.
    pub fn sink(&self) -> Arc<dyn Sink> {
        let current = self.slot.load_full();
        if let Some(memo) = self.memo.load_full() {
            if Arc::ptr_eq(&memo.basis, &current) {
                return Arc::clone(&memo.refined);
            }
        }

        let refined = self
            .refinements
            .iter()
            .fold(Arc::clone(&current.sink), |sink, refinement| {
                refinement.apply(sink)
            });
        self.memo.store(Some(Arc::new(Memo {
            basis: current,
            refined: Arc::clone(&refined),
        })));
        refined
    }

    /// Deliver a record through the effective sink.
    ///
    /// No admission check happens here; callers gate on
    /// [`Handler::enabled`] (the convenience methods below do). Sink
    /// errors propagate unchanged.
    pub fn handle(&self, record: &Record) -> Result<(), SinkError> {
        self.sink().handle(record)
    }

    /// Emit `message` at `severity` if currently admitted
    #[inline]
    pub fn log(&self, severity: Severity, message: &str) {
        if !self.enabled(severity) {
            return;
        }
        let _ = self.handle(&Record::new(severity, message));
    }

    /// Emit `message` with attributes at `severity` if currently admitted
    #[inline]
    pub fn log_kv(&self, severity: Severity, message: &str, attrs: &[Attr]) {
        if !self.enabled(severity) {
            return;
        }
        let mut record = Record::new(severity, message);
        record.add_attrs(attrs);
        let _ = self.handle(&record);
    }

    /// Log with emergency severity
    #[inline]
    pub fn emergency(&self, message: &str) {
        self.log(Severity::Emergency, message);
    }

    /// Log with alert severity
    #[inline]
    pub fn alert(&self, message: &str) {
        self.log(Severity::Alert, message);
    }

    /// Log with critical severity
    #[inline]
    pub fn critical(&self, message: &str) {
        self.log(Severity::Critical, message);
    }

    /// Log with error severity
    #[inline]
    pub fn error(&self, message: &str) {
        self.log(Severity::Error, message);
    }

    /// Log with warning severity
    #[inline]
    pub fn warning(&self, message: &str) {
        self.log(Severity::Warning, message);
    }

    /// Log with notice severity
    #[inline]
    pub fn notice(&self, message: &str) {
        self.log(Severity::Notice, message);
    }

    /// Log with info severity
    #[inline]
    pub fn info(&self, message: &str) {
        self.log(Severity::Info, message);
    }

    /// Log with debug severity
    #[inline]
    pub fn debug(&self, message: &str) {
        self.log(Severity::Debug, message);
    }
}

impl Clone for Handler {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            cell: Arc::clone(&self.cell),
            refinements: Arc::clone(&self.refinements),
            memo: ArcSwapOption::new(self.memo.load_full()),
        }
    }
}
