//! Casein Eval - the `case/in` pattern-matching engine.
//!
//! # Architecture
//!
//! - `CaseHost`: the host collaborator (expressions, external references,
//!   case equality, deconstruction hooks, rendering)
//! - `Environment`: scope stack with `declare` / `commit`
//! - deconstruction adapter: at most one hook call per value per dispatch
//! - matcher: recursive, rollback on failed branches, leftmost find windows
//! - `CaseEvaluator`: arm dispatch, guards, `else`, one-line forms
//!
//! # Re-exports
//!
//! Values, patterns and errors come from `casein_patterns`.

mod classify;
mod config;
mod deconstruct;
mod dispatch;
mod environment;
mod host;
mod matcher;
mod stack;
mod tracing_setup;

pub use casein_patterns::{
    ArrayPattern, BindTarget, CaseArm, CaseExpr, EvalError, EvalErrorKind, EvalResult, Guard,
    HashPattern, HashRest, MatchPattern, OneLineMatch, OneLineMode, Splat, Value, ValueRef,
};

pub use classify::{classify, ErrorClass};
pub use config::{DispatchConfig, KeysCachePolicy};
pub use dispatch::{CaseEvaluator, CaseEvaluatorBuilder};
pub use environment::{Environment, LocalScope, Scope, ScopedEnv};
pub use host::{CaseHost, ExprFn, ExprTable, RegisterError};
pub use matcher::{Bindings, MatchOutcome};
pub use stack::ensure_sufficient_stack;
pub use tracing_setup::init_tracing;
