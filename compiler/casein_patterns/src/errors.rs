//! Error types for `case/in` evaluation.
//!
//! # Structured Error Categories
//!
//! `EvalErrorKind` is the typed category; factory functions (`type_error()`,
//! `no_matching_pattern()`, ...) are the public API and populate both `kind`
//! and `message`. A structural mismatch is never an error: the matcher
//! reports it as a non-match and only the dispatcher turns "no arm matched"
//! into `NoMatchingPattern`.

use thiserror::Error;

use crate::value::{ShapeError, Value};

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
///
/// Each variant carries the data for its message and has a stable code in
/// the `E7xxx` range (see `error_code`).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalErrorKind {
    /// A deconstruction hook returned the wrong kind of value.
    #[error("{message}")]
    TypeError { message: String },

    /// No arm matched and there was no `else`. The message is the
    /// inspect-style rendering of the scrutinee.
    #[error("{rendered}")]
    NoMatchingPattern { rendered: String },

    /// A pinned local was not bound and not visible in scope.
    #[error("undefined variable: {name}")]
    UndefinedVariable { name: String },

    /// A host collaborator (expression evaluation, external lookup) failed.
    #[error("{message}")]
    Host { message: String },

    /// Catch-all for errors without a structured kind.
    #[error("{message}")]
    Custom { message: String },
}

impl EvalErrorKind {
    /// Stable diagnostic code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Custom { .. } => "E7000",
            Self::TypeError { .. } => "E7001",
            Self::NoMatchingPattern { .. } => "E7002",
            Self::UndefinedVariable { .. } => "E7003",
            Self::Host { .. } => "E7004",
        }
    }

    /// Exception class name as the host language reports it.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TypeError { .. } => "TypeError",
            Self::NoMatchingPattern { .. } => "NoMatchingPatternError",
            Self::UndefinedVariable { .. } => "NameError",
            Self::Host { .. } | Self::Custom { .. } => "RuntimeError",
        }
    }
}

/// Additional context note attached to an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalNote {
    pub message: String,
}

impl EvalNote {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()` for factory-built
    /// errors.
    pub message: String,
    /// Secondary context, outermost last.
    pub notes: Vec<EvalNote>,
}

impl EvalError {
    /// Create an error with just a message (`Custom` kind).
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
            notes: Vec::new(),
        }
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            notes: Vec::new(),
        }
    }

    /// Add a context note to this error.
    #[must_use]
    pub fn with_note(mut self, note: EvalNote) -> Self {
        self.notes.push(note);
        self
    }

    #[inline]
    pub fn is_no_match(&self) -> bool {
        matches!(self.kind, EvalErrorKind::NoMatchingPattern { .. })
    }

    #[inline]
    pub fn is_type_error(&self) -> bool {
        matches!(self.kind, EvalErrorKind::TypeError { .. })
    }
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.kind.name())
    }
}

impl std::error::Error for EvalError {}

impl From<ShapeError> for EvalError {
    fn from(error: ShapeError) -> Self {
        shape_error(&error)
    }
}

// Pattern Errors

/// Wrong deconstruction shape.
#[cold]
pub fn type_error(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeError {
        message: message.into(),
    })
}

/// `TypeError` for a deconstruction that returned the wrong shape.
#[cold]
pub fn shape_error(error: &ShapeError) -> EvalError {
    let hook = error.capability().hook_name();
    match error {
        ShapeError::NotArray { got } => type_error(format!("{hook} must return Array"))
            .with_note(EvalNote::new(format!("{hook} returned {got}"))),
        ShapeError::NotHash { got } => type_error(format!("{hook} must return Hash"))
            .with_note(EvalNote::new(format!("{hook} returned {got}"))),
        ShapeError::NonSymbolKey { key } => {
            type_error(format!("wrong argument type String (expected Symbol) for key {key:?}"))
                .with_note(EvalNote::new(format!("key returned by {hook}")))
        }
    }
}

/// No arm matched; `rendered` is the inspected scrutinee.
#[cold]
pub fn no_matching_pattern(rendered: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoMatchingPattern {
        rendered: rendered.into(),
    })
}

// Host Errors

/// Undefined variable error.
#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

/// Failure reported by a host collaborator.
#[cold]
pub fn host_error(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Host {
        message: message.into(),
    })
}
