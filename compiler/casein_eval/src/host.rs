//! The host collaborator: everything the engine needs from the surrounding
//! language but does not implement itself.

use std::cell::RefCell;

use casein_ir::{ExprId, ExternalKind, ExternalRef, Name, SharedInterner, StringInterner};
use casein_patterns::errors::{host_error, undefined_variable};
use casein_patterns::{Deconstructed, EvalError, EvalResult, HashValue, Heap, Value};
use rustc_hash::FxHashMap;

use crate::Environment;

/// Host collaborator.
///
/// Expression evaluation and external reads and writes are required. The
/// predicate and deconstruction collaborators default to the value's own
/// behavior; override them to model refinements or a different host value
/// system.
pub trait CaseHost {
    /// Evaluate an expression: scrutinee, guard, pinned `^(expr)`, arm body
    /// or `else` body.
    fn eval(&self, expr: ExprId, env: &mut Environment) -> EvalResult;

    /// Resolve `@ivar`, `@@cvar`, `$global` or a constant.
    fn resolve_external(&self, reference: ExternalRef) -> EvalResult;

    /// Store a value bound by `in @ivar`, `in {a: $a}` or `=> @@cvar`.
    /// Called when the arm's bindings are committed.
    fn assign_external(&self, reference: ExternalRef, value: Value) -> Result<(), EvalError>;

    /// `pattern === target`.
    fn case_eq(&self, pattern: &Value, target: &Value) -> Result<bool, EvalError> {
        Ok(pattern.case_eq(target))
    }

    /// Sequence capability of `value`.
    fn deconstruct(&self, value: &Value) -> Result<Deconstructed<Heap<Vec<Value>>>, EvalError> {
        Ok(value.deconstruct())
    }

    /// Mapping capability of `value`; `None` asks for every key.
    fn deconstruct_keys(
        &self,
        value: &Value,
        keys: Option<&[Name]>,
    ) -> Result<Deconstructed<Heap<HashValue>>, EvalError> {
        Ok(value.deconstruct_keys(keys))
    }

    /// Text carried by `NoMatchingPatternError`.
    fn render(&self, value: &Value, interner: &StringInterner) -> String {
        value.display(interner).to_string()
    }
}

/// Error when registering an expression fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// Every id below `ExprId::INVALID` is taken.
    Overflow { count: usize },
}

impl std::fmt::Display for RegisterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegisterError::Overflow { count } => write!(
                f,
                "expression table exceeded capacity: {count} expressions, max is {}",
                u32::MAX - 1
            ),
        }
    }
}

impl std::error::Error for RegisterError {}

/// Expression body registered in an `ExprTable`.
pub type ExprFn<'f> = dyn Fn(&mut Environment) -> EvalResult + 'f;

/// A ready-made host whose expressions are closures registered up front.
///
/// ```text
/// let mut table = ExprTable::new(interner.clone());
/// let scrutinee = table.value(Value::int(1));
/// let body = table.register(|env| Ok(env.lookup(x).unwrap_or(Value::Nil)));
/// ```
pub struct ExprTable<'f> {
    interner: SharedInterner,
    exprs: Vec<Box<ExprFn<'f>>>,
    externals: RefCell<FxHashMap<ExternalRef, Value>>,
}

impl<'f> ExprTable<'f> {
    pub fn new(interner: SharedInterner) -> Self {
        ExprTable {
            interner,
            exprs: Vec::new(),
            externals: RefCell::default(),
        }
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Try to register an expression, returning its handle or an error on
    /// overflow.
    pub fn try_register(
        &mut self,
        f: impl Fn(&mut Environment) -> EvalResult + 'f,
    ) -> Result<ExprId, RegisterError> {
        let id = next_id(self.exprs.len())?;
        self.exprs.push(Box::new(f));
        Ok(id)
    }

    /// Register an expression and return its handle.
    ///
    /// # Panics
    /// Panics if the table already holds `u32::MAX - 1` expressions.
    pub fn register(&mut self, f: impl Fn(&mut Environment) -> EvalResult + 'f) -> ExprId {
        self.try_register(f).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Register an expression that evaluates to `value`.
    pub fn value(&mut self, value: Value) -> ExprId {
        self.register(move |_| Ok(value.clone()))
    }

    /// Register an expression that reads variable `name` (`nil` if unset).
    pub fn variable(&mut self, name: Name) -> ExprId {
        self.register(move |env| Ok(env.lookup(name).unwrap_or(Value::Nil)))
    }

    /// Make `reference` resolve to `value`.
    pub fn define_external(&mut self, reference: ExternalRef, value: Value) {
        self.externals.get_mut().insert(reference, value);
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}

/// Handle for the expression stored at `len`. `ExprId::INVALID` is never
/// handed out.
fn next_id(len: usize) -> Result<ExprId, RegisterError> {
    u32::try_from(len)
        .ok()
        .map(ExprId::new)
        .filter(|id| id.is_valid())
        .ok_or(RegisterError::Overflow { count: len })
}

impl CaseHost for ExprTable<'_> {
    fn eval(&self, expr: ExprId, env: &mut Environment) -> EvalResult {
        match self.exprs.get(expr.index()) {
            Some(f) => f(env),
            None => Err(EvalError::new(format!("unknown expression {expr:?}"))),
        }
    }

    fn resolve_external(&self, reference: ExternalRef) -> EvalResult {
        self.externals.borrow().get(&reference).cloned().ok_or_else(|| {
            undefined_variable(&format!(
                "{}{}",
                reference.kind.sigil(),
                self.interner.lookup(reference.name)
            ))
        })
    }

    fn assign_external(&self, reference: ExternalRef, value: Value) -> Result<(), EvalError> {
        if matches!(reference.kind, ExternalKind::Constant) {
            return Err(host_error(format!(
                "cannot bind constant {}",
                self.interner.lookup(reference.name)
            )));
        }
        self.externals.borrow_mut().insert(reference, value);
        Ok(())
    }

    fn case_eq(&self, pattern: &Value, target: &Value) -> Result<bool, EvalError> {
        Ok(pattern.case_eq_with(target, |v| v.as_symbol().map(|n| self.interner.lookup(n))))
    }
}
