//! VM error types

use std::fmt;

use finch_sdk::NativeError;

/// A compile (lex or parse) error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("[line {line}] {message}")]
pub struct CompileError {
    /// 1-based line
    pub line: u32,
    /// Description
    pub message: String,
}

impl CompileError {
    /// Create a compile error.
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Classification of a runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Raised by script code (`Fiber.abort`, type errors, undefined names)
    Script,
    /// A foreign method or class had no native implementation
    Binding,
    /// A native call read or wrote a slot with the wrong shape
    Marshal,
    /// A native operation reported failure
    Native,
    /// The embedding API was misused (stale handle, missing variable)
    Api,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Script => "script",
            ErrorKind::Binding => "binding",
            ErrorKind::Marshal => "marshal",
            ErrorKind::Native => "native",
            ErrorKind::Api => "api",
        };
        f.write_str(name)
    }
}

/// One entry of a runtime error's stack trace, innermost first.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceFrame {
    /// Module the code belongs to
    pub module: String,
    /// Line executing when the error passed through this frame
    pub line: u32,
    /// `Class.signature` or `(script)` for top-level code
    pub function: String,
}

/// A runtime error with the stack it unwound through.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct RuntimeError {
    /// Classification
    pub kind: ErrorKind,
    /// Description
    pub message: String,
    /// Frames the error unwound through, innermost first
    pub trace: Vec<TraceFrame>,
}

impl RuntimeError {
    /// Create an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            trace: Vec::new(),
        }
    }

    /// Error raised by script code.
    pub fn script(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Script, message)
    }

    /// Missing native binding.
    pub fn binding(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Binding, message)
    }

    /// Embedding API misuse.
    pub fn api(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Api, message)
    }

    /// Wrap an error returned by a native handler.
    pub fn from_native(error: &NativeError) -> Self {
        let kind = if error.is_marshal() {
            ErrorKind::Marshal
        } else {
            ErrorKind::Native
        };
        Self::new(kind, error.to_string())
    }

    pub(crate) fn push_frame(&mut self, module: &str, line: u32, function: impl Into<String>) {
        self.trace.push(TraceFrame {
            module: module.to_string(),
            line,
            function: function.into(),
        });
    }

    /// Module and line where the error was raised, if known.
    pub fn origin(&self) -> Option<(&str, u32)> {
        self.trace.first().map(|f| (f.module.as_str(), f.line))
    }
}

/// Error returned by [`crate::Vm::interpret`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum InterpretError {
    /// The module failed to lex or parse
    #[error("Compile error in module '{module}': {}", first_message(.errors))]
    Compile {
        /// Module name
        module: String,
        /// All errors found
        errors: Vec<CompileError>,
    },

    /// Top-level code raised a runtime error
    #[error("Runtime error: {0}")]
    Runtime(RuntimeError),
}

fn first_message(errors: &[CompileError]) -> String {
    errors
        .first()
        .map(|e| e.to_string())
        .unwrap_or_default()
}

/// Category passed to the error callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// A compile error; line and message describe it
    Compile,
    /// A runtime error; message describes it, line is where it was raised
    Runtime,
    /// One frame of the preceding runtime error's stack trace; message is
    /// the function name
    StackTrace,
}
