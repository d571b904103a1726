//! Casein Patterns - the data the matcher works on.
//!
//! - `Value`: the host value model, with case equality (`case_eq`),
//!   inspect-style rendering and the two deconstruction capabilities
//! - `MatchPattern` and friends: the immutable pattern tree for one `in`
//!   clause, plus `CaseExpr` / `CaseArm` for a whole `case/in`
//! - `EvalError`: the external error taxonomy and its factory functions

mod case_expr;
pub mod errors;
mod pattern;
pub mod value;

pub use case_expr::{CaseArm, CaseExpr, Guard, OneLineMatch, OneLineMode};
pub use errors::{EvalError, EvalErrorKind, EvalNote, EvalResult};
pub use pattern::{
    ArrayPattern, BindTarget, FindWindow, HashPattern, HashRest, MatchPattern, Splat, ValueRef,
};
pub use value::{
    BuiltinClass, Capability, ClassRef, Deconstructed, HashValue, Heap, ObjectValue, RangeValue,
    ShapeError, Value, ValueDisplay, ValueId,
};
