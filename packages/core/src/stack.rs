//! Call-stack snapshots attached to every chain link.
//!
//! A [`StackTrace`] is captured when a `CodedError` is constructed, so the
//! renderer can point at the wrap site rather than at this crate's own
//! constructors. Frames belonging to the capture machinery and to the
//! constructors themselves are skipped; frame 0 is the invoking call site.
//!
//! Symbol resolution depends on debug info being present. In stripped
//! builds the trace may come back empty; the renderer degrades to an
//! ordinal-only caller in that case.

use std::fmt;

/// Upper bound on retained frames per snapshot.
const MAX_FRAMES: usize = 32;

/// Symbol-name prefixes that belong to the capture path itself, not to the
/// code that asked for an error.
const INTERNAL_SYMBOLS: &[&str] = &[
    "backtrace::",
    "coded_errors::stack::StackTrace::capture",
    "coded_errors::error::build",
    "coded_errors::error::with_code",
    "coded_errors::error::wrap_code",
    "coded_errors::error::CodedError::wrap",
];

/// One resolved call level: program counter plus source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    ip: usize,
    file: String,
    line: u32,
    function: String,
}

impl Frame {
    pub(crate) fn new(
        ip: usize,
        file: impl Into<String>,
        line: u32,
        function: impl Into<String>,
    ) -> Self {
        Self {
            ip,
            file: file.into(),
            line,
            function: function.into(),
        }
    }

    /// Program counter of this call level.
    pub fn ip(&self) -> usize {
        self.ip
    }

    /// Source file path, empty when unresolved.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Source line, 0 when unresolved.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Demangled function name without the trailing symbol hash.
    pub fn function(&self) -> &str {
        &self.function
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.file, self.line, self.function)
    }
}

/// Snapshot of the active call stack, invoking code first.
#[derive(Debug, Clone, Default)]
pub struct StackTrace {
    frames: Vec<Frame>,
}

impl StackTrace {
    /// Capture the current call stack from the invoking code's perspective.
    pub fn capture() -> Self {
        let bt = backtrace::Backtrace::new();
        let mut frames = Vec::new();
        let mut in_caller_frames = false;

        for frame in bt.frames() {
            if frames.len() >= MAX_FRAMES {
                break;
            }
            let symbol = match frame.symbols().iter().find(|s| s.name().is_some()) {
                Some(symbol) => symbol,
                None => continue,
            };
            let function = match symbol.name() {
                Some(name) => short_name(&format!("{:#}", name)),
                None => continue,
            };
            if !in_caller_frames {
                if is_internal(&function) {
                    continue;
                }
                in_caller_frames = true;
            }
            frames.push(Frame {
                ip: frame.ip() as usize,
                file: symbol
                    .filename()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                line: symbol.lineno().unwrap_or(0),
                function,
            });
        }

        Self { frames }
    }

    /// All captured frames, invoking code first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The frame at the wrap site, if resolution succeeded.
    pub fn top(&self) -> Option<&Frame> {
        self.frames.first()
    }

    /// `true` when no frame could be resolved.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

fn is_internal(function: &str) -> bool {
    INTERNAL_SYMBOLS
        .iter()
        .any(|prefix| function.contains(prefix))
}

/// Strip any path prefix before the final path separator, so prefixed
/// symbols render as the bare qualified name.
fn short_name(name: &str) -> String {
    match name.rsplit('/').next() {
        Some(short) => short.to_string(),
        None => name.to_string(),
    }
}
