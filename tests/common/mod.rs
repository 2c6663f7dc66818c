// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Shared helpers for integration tests: capture sinks backed by an
//! inspectable in-memory buffer.

use logroute::{Sink, TextSink};
use std::sync::{Arc, Mutex};

/// Text sink writing into a shared buffer the test can read back
pub fn capture() -> (Arc<Mutex<Vec<u8>>>, Arc<dyn Sink>) {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let sink: Arc<dyn Sink> = Arc::new(TextSink::from_shared(Arc::clone(&buffer)));
    (buffer, sink)
}

/// Everything written so far, as one string
pub fn captured(buffer: &Arc<Mutex<Vec<u8>>>) -> String {
    String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
}

/// Everything written so far, split into lines
pub fn lines(buffer: &Arc<Mutex<Vec<u8>>>) -> Vec<String> {
    captured(buffer)
        .lines()
        .map(|line| line.to_string())
        .collect()
}
