// Live-reconfigurable structured logging
//
// Applications create cheap named handlers (and derive refined ones via
// attributes/groups) at any point in their lifetime; a registry can
// atomically repoint where and at what severity any of them write,
// without tracking or notifying a single handler. Emission costs a few
// atomic loads; reconfiguration is serialized behind one registry mutex.

mod config;
mod handler;
#[macro_use]
mod macros;
mod middleware;
mod record;
mod registry;
mod severity;
mod sink;

// Public exports
pub use handler::Handler;
pub use middleware::Middleware;
pub use record::{Attr, Record, Value};
pub use registry::{global, handler, set_global, Registry, DEFAULT_NAME};
pub use severity::{Severity, SeverityCell};
pub use sink::{JsonSink, NoopSink, Sink, SinkError, TextSink};
