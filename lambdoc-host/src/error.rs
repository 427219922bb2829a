//! Evaluation errors
//!
//! Errors carry a kind, a human-readable message and the position traces
//! attached while they propagated.

use serde::Serialize;
use std::fmt::{self, Write as _};
use std::io;
use thiserror::Error;

/// Category of an evaluation error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Generic evaluation failure
    Eval,
    /// A value had the wrong type
    Type,
    /// Name lookup failed
    UndefinedVar,
    /// Primop called with the wrong number of arguments
    Arity,
    /// Output could not be written
    Io,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Eval => "error",
            ErrorKind::Type => "type error",
            ErrorKind::UndefinedVar => "undefined variable",
            ErrorKind::Arity => "arity error",
            ErrorKind::Io => "i/o error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Position note attached to an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trace {
    /// Rendered position (`file:line:column`)
    pub pos: String,
    pub hint: String,
}

/// Error raised while evaluating
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct EvalError {
    pub kind: ErrorKind,
    pub message: String,
    pub traces: Vec<Trace>,
}

impl EvalError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            traces: Vec::new(),
        }
    }

    /// Builder: add position trace
    pub fn with_trace(mut self, pos: impl fmt::Display, hint: impl Into<String>) -> Self {
        self.traces.push(Trace {
            pos: pos.to_string(),
            hint: hint.into(),
        });
        self
    }

    // ========== Common Error Constructors ==========

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, message)
    }

    pub fn undefined_var(name: &str) -> Self {
        Self::new(ErrorKind::UndefinedVar, format!("undefined variable '{}'", name))
    }

    pub fn arity(name: &str, expected: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::Arity,
            format!("'{}' expects {} arguments, got {}", name, expected, got),
        )
    }

    pub fn infinite_recursion() -> Self {
        Self::new(ErrorKind::Eval, "infinite recursion encountered")
    }

    pub fn is_type_error(&self) -> bool {
        self.kind == ErrorKind::Type
    }
}

impl From<io::Error> for EvalError {
    fn from(err: io::Error) -> Self {
        Self::new(ErrorKind::Io, err.to_string())
    }
}

/// Fill a `%N%` message template with 1-based arguments.
///
/// Placeholders without a matching argument are kept verbatim.
pub fn hintfmt(template: &str, args: &[&dyn fmt::Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match placeholder(after, args.len()) {
            Some((n, used)) => {
                let _ = write!(out, "{}", args[n - 1]);
                rest = &after[used..];
            }
            None => {
                out.push('%');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parse `N%` at the start of `s`, returning the argument number and the
/// bytes consumed.
fn placeholder(s: &str, nargs: usize) -> Option<(usize, usize)> {
    let end = s.find('%')?;
    let n: usize = s[..end].parse().ok()?;
    (1..=nargs).contains(&n).then_some((n, end + 1))
}
