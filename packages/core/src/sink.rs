//! Boundary to the logging collaborator.
//!
//! The core hands pre-rendered chain text to a [`LogSink`] and nothing
//! more: level filtering, buffering, and destinations belong to the
//! collaborator behind the trait. A sink must accept arbitrary byte
//! sequences synchronously.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::error::CodedError;
use crate::format::{render, RenderFlags};

/// Synchronous consumer of rendered error text.
pub trait LogSink {
    fn accept(&self, rendered: &[u8]);
}

/// Sink writing to any [`io::Write`](std::io::Write) destination.
///
/// Write failures are reported through `tracing` and otherwise swallowed;
/// emitting an error must never produce another one.
pub struct WriterSink<W: Write> {
    writer: Mutex<W>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the wrapped writer, e.g. to inspect captured output.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write> LogSink for WriterSink<W> {
    fn accept(&self, rendered: &[u8]) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = writer.write_all(rendered) {
            warn!(%err, "log sink write failed");
        }
    }
}

/// Sink forwarding rendered chains to the active `tracing` subscriber as
/// error events.
pub struct TracingSink;

impl LogSink for TracingSink {
    fn accept(&self, rendered: &[u8]) {
        tracing::error!(target: "coded_errors", "{}", String::from_utf8_lossy(rendered));
    }
}

/// Render `err` with `flags` and hand the result to `sink`.
pub fn emit(err: &CodedError, flags: RenderFlags, sink: &dyn LogSink) {
    sink.accept(render(err, flags).as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{register, DefaultCoder};
    use crate::error::with_code;
    use std::sync::Arc;

    // Registry codes used here live in the 50xx range.

    #[test]
    fn writer_sink_receives_rendered_bytes() {
        register(Arc::new(DefaultCoder::new(5001, 500, "Sync failed")));
        let err = with_code(5001, "replica 3 behind");

        let sink = WriterSink::new(Vec::new());
        emit(&err, RenderFlags::plain(), &sink);

        let written = sink.into_inner();
        assert_eq!(String::from_utf8(written).unwrap(), "Sync failed");
    }

    #[test]
    fn writer_sink_appends_across_emits() {
        register(Arc::new(DefaultCoder::new(5002, 500, "A")));
        let err = with_code(5002, "first");

        let sink = WriterSink::new(Vec::new());
        emit(&err, RenderFlags::plain(), &sink);
        emit(&err, RenderFlags::plain(), &sink);

        assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "AA");
    }

    #[test]
    fn tracing_sink_accepts_any_bytes() {
        // No subscriber is installed here; the event is simply dropped.
        TracingSink.accept(b"rendered chain");
        TracingSink.accept(&[0xff, 0xfe]);
    }

    #[test]
    fn emit_renders_json_when_asked() {
        let err = with_code(5901, "unregistered");
        let sink = WriterSink::new(Vec::new());
        emit(&err, RenderFlags::plain().json(), &sink);

        let written = String::from_utf8(sink.into_inner()).unwrap();
        assert!(written.starts_with('['), "expected JSON array: {}", written);
    }
}
