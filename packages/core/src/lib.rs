//! Structured errors for service backends.
//!
//! Call sites attach a stable numeric code to every failure, wrap causes
//! into an owned chain, and capture the call site at each wrap point. A
//! process-wide registry maps codes to [`Coder`] descriptors (HTTP status,
//! user-safe message, documentation reference); the renderer turns a chain
//! into terse, detailed, or full-trace output as text or JSON.
//!
//! ```no_run
//! use std::sync::Arc;
//! use coded_errors::{register, wrap_code, with_code, DefaultCoder, RenderFlags};
//!
//! // Startup: provision the code space.
//! register(Arc::new(DefaultCoder::new(100101, 500, "Database unavailable")));
//! register(Arc::new(DefaultCoder::new(100102, 404, "Record not found")));
//!
//! // Failure path: wrap with the code of the current layer.
//! let root = with_code!(100101, "connect to {} timed out", "10.0.0.4:5432");
//! let err = wrap_code(Some(root), 100102, "loading user 42").unwrap();
//!
//! // End users see the terse message, operators the full chain.
//! println!("{}", err);
//! tracing::error!("{}", err.render(RenderFlags::trace().json()));
//! ```

pub mod api;
pub mod code;
pub mod error;
pub mod format;
pub mod logging;
pub mod metrics;
pub mod sink;
pub mod stack;

pub use api::ErrorBody;
pub use code::{
    fallback_coder, is_code, lookup, register, register_strict, resolve, try_register,
    try_register_strict, Coder, DefaultCoder, RegistryError, FALLBACK_CODE, RESERVED_CODE,
};
pub use error::{with_code, wrap_code, BoxError, CodedError};
pub use format::{render, RenderFlags};
pub use logging::init_logging;
pub use metrics::ErrorMetrics;
pub use sink::{emit, LogSink, TracingSink, WriterSink};
pub use stack::{Frame, StackTrace};

/// Convenience alias for results whose error is a [`CodedError`].
pub type Result<T> = std::result::Result<T, CodedError>;
