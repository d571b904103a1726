//! Error classification.
//!
//! A structural mismatch is not an error; it advances the dispatcher to the
//! next arm. A deconstruction that returns the wrong shape is a `TypeError`
//! and aborts the whole dispatch. `NoMatchingPatternError` is raised only
//! after every arm has been tried.

use casein_patterns::errors::shape_error;
use casein_patterns::{Deconstructed, EvalError, EvalErrorKind};

/// How an error relates to the dispatch that produced it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// The dispatch ran to completion and found nothing; the caller may
    /// rescue it like any ordinary exception.
    Recoverable,
    /// The dispatch was cut short; later arms were never tried.
    Fatal,
}

pub fn classify(error: &EvalError) -> ErrorClass {
    match error.kind {
        EvalErrorKind::NoMatchingPattern { .. } => ErrorClass::Recoverable,
        EvalErrorKind::TypeError { .. }
        | EvalErrorKind::UndefinedVariable { .. }
        | EvalErrorKind::Host { .. }
        | EvalErrorKind::Custom { .. } => ErrorClass::Fatal,
    }
}

/// Fold a capability answer into the matcher's terms: `Ok(Some)` to keep
/// matching, `Ok(None)` for a non-match, `Err` for a `TypeError`.
pub(crate) fn fold<T>(answer: Deconstructed<T>) -> Result<Option<T>, EvalError> {
    match answer {
        Deconstructed::Supported(value) => Ok(Some(value)),
        Deconstructed::Unsupported => Ok(None),
        Deconstructed::WrongShape(error) => Err(shape_error(&error)),
    }
}
