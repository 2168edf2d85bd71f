//! HTTP-facing adapters.
//!
//! Handlers return `Result<_, CodedError>`; the adapter answers with the
//! resolved coder's HTTP status and a body carrying only the user-safe
//! fields. Raw messages and call sites never cross this boundary.

pub mod response;

pub use response::ErrorBody;
