// SPDX-License-Identifier: Apache-2.0 OR MIT
// Middleware: ordered wrappers around a sink

use crate::Sink;
use std::sync::Arc;

/// A transform that wraps a sink, intercepting record delivery before
/// forwarding to the next sink in the chain.
///
/// Middleware composes in registration order: the first entry of a chain
/// is the outermost wrapper, so its `handle` runs first on the way in.
pub trait Middleware: Send + Sync {
    /// Wrap `next`, returning the wrapping sink
    fn apply(&self, next: Arc<dyn Sink>) -> Arc<dyn Sink>;
}

impl<F> Middleware for F
where
    F: Fn(Arc<dyn Sink>) -> Arc<dyn Sink> + Send + Sync,
{
    fn apply(&self, next: Arc<dyn Sink>) -> Arc<dyn Sink> {
        self(next)
    }
}

/// Apply `chain` to `sink` so that `chain[0]` ends up outermost
pub(crate) fn compose(chain: &[Arc<dyn Middleware>], sink: Arc<dyn Sink>) -> Arc<dyn Sink> {
    chain.iter().rev().fold(sink, |inner, mw| mw.apply(inner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attr, Record, Severity, SinkError, TextSink};
    use std::sync::Mutex;

    /// Wrapper sink that prepends a marker to every message
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

    fn marker(tag: &'static str) -> Arc<dyn Middleware> {
        Arc::new(move |next: Arc<dyn Sink>| Arc::new(Marker { next, tag }) as Arc<dyn Sink>)
    }

    #[test]
    fn test_compose_first_entry_outermost() {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink: Arc<dyn Sink> = Arc::new(TextSink::from_shared(Arc::clone(&buffer)));

        let chain = vec![marker("A"), marker("B")];
        let composed = compose(&chain, sink);
        composed.handle(&Record::new(Severity::Info, "x")).unwrap();

        // A runs first on the way in, so B sees A's output
        let line = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert_eq!(line, "[INFO] B:A:x\n");
    }

    #[test]
    fn test_compose_empty_chain_is_identity() {
        let sink = crate::NoopSink::shared();
        let composed = compose(&[], Arc::clone(&sink));
        assert!(Arc::ptr_eq(&sink, &composed));
    }
}
