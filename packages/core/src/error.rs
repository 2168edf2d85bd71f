//! The chained error value.
//!
//! A [`CodedError`] carries the message formatted at its wrap point, the
//! error code for that layer, an optional cause (the previous link in the
//! chain), and the call-stack snapshot taken when the link was created.
//! Wrapping consumes the prior error by value, so a chain is strictly
//! linear and owned by whichever head is passed around.

use std::error::Error as StdError;
use std::fmt;

use crate::format::{self, RenderFlags};
use crate::metrics;
use crate::stack::StackTrace;

/// Boxed error trait object accepted as a cause.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// One link of a coded error chain. Immutable once constructed.
pub struct CodedError {
    message: String,
    code: i32,
    cause: Option<BoxError>,
    stack: StackTrace,
}

fn build(code: i32, message: String, cause: Option<BoxError>) -> CodedError {
    CodedError {
        message,
        code,
        cause,
        stack: StackTrace::capture(),
    }
}

/// Root constructor: a new chain with no cause.
///
/// Prefer the [`with_code!`](crate::with_code) macro when the message is a
/// format template; it evaluates the template eagerly at the call site.
pub fn with_code(code: i32, message: impl Into<String>) -> CodedError {
    if let Some(m) = metrics::installed() {
        m.record_error_created();
    }
    build(code, message.into(), None)
}

/// Wrap constructor: a new link owning `cause` as its tail.
///
/// Wrapping an absent error is a no-op: `None` in, `None` out.
pub fn wrap_code<E>(cause: Option<E>, code: i32, message: impl Into<String>) -> Option<CodedError>
where
    E: Into<BoxError>,
{
    let cause = cause?;
    if let Some(m) = metrics::installed() {
        m.record_error_wrapped();
    }
    Some(build(code, message.into(), Some(cause.into())))
}

impl CodedError {
    /// Wrap this error under a new code, consuming it.
    pub fn wrap(self, code: i32, message: impl Into<String>) -> CodedError {
        if let Some(m) = metrics::installed() {
            m.record_error_wrapped();
        }
        build(code, message.into(), Some(Box::new(self)))
    }

    /// The code attached at this link.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// The raw message formatted at this wrap point.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The previous link in the chain, if any.
    pub fn cause(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_ref()
            .map(|c| c.as_ref() as &(dyn StdError + 'static))
    }

    /// The call-stack snapshot taken when this link was created.
    pub fn stack(&self) -> &StackTrace {
        &self.stack
    }

    /// Render this chain with explicit flags; see [`crate::format`].
    pub fn render(&self, flags: RenderFlags) -> String {
        format::render(self, flags)
    }
}

impl StdError for CodedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause()
    }
}

impl fmt::Display for CodedError {
    /// Plain form is the user-safe display message; the alternate form
    /// (`{:#}`) adds the head link's call site and code.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str(&format::render(self, RenderFlags::detail()))
        } else {
            f.write_str(&format::display_message(self))
        }
    }
}

impl fmt::Debug for CodedError {
    /// Full trace text, most recent link first, for logs and test output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format::render(self, RenderFlags::trace()))
    }
}

/// Build a root [`CodedError`], formatting the message eagerly.
#[macro_export]
macro_rules! with_code {
    ($code:expr, $($arg:tt)+) => {
        $crate::error::with_code($code, ::std::format!($($arg)+))
    };
}

/// Wrap an optional cause under a new code, formatting the message
/// eagerly. Yields `None` when the cause is `None`.
#[macro_export]
macro_rules! wrap_code {
    ($cause:expr, $code:expr, $($arg:tt)+) => {
        $crate::error::wrap_code($cause, $code, ::std::format!($($arg)+))
    };
}
