//! Pattern matcher.
//!
//! `match_node` returns `Ok(true)` / `Ok(false)` and appends to a shared
//! `Bindings` buffer. Any branch that fails truncates the buffer back to
//! where it started, so alternation branches and find windows never see each
//! other's bindings. Errors short-circuit the whole attempt.
//!
//! Retries only redo structural work: deconstruction answers come from the
//! dispatch-wide `Deconstructor` cache.

mod hash;
mod list;

use casein_ir::{Name, StringInterner};
use casein_patterns::errors::undefined_variable;
use casein_patterns::{BindTarget, EvalError, MatchPattern, Value, ValueRef};
use smallvec::SmallVec;

use crate::config::DispatchConfig;
use crate::deconstruct::{DeconstructStats, Deconstructor};
use crate::host::CaseHost;
use crate::stack::ensure_sufficient_stack;
use crate::Environment;

/// Variables produced by one successful match attempt.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bindings {
    entries: SmallVec<[(BindTarget, Value); 4]>,
}

impl Bindings {
    pub fn new() -> Self {
        Bindings::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Latest value bound to `target` in this attempt.
    pub fn get(&self, target: impl Into<BindTarget>) -> Option<&Value> {
        let target = target.into();
        self.entries
            .iter()
            .rev()
            .find_map(|(t, v)| (*t == target).then_some(v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (BindTarget, &Value)> {
        self.entries.iter().map(|(t, v)| (*t, v))
    }

    /// Local bindings only, for the guard's temporary scope.
    pub fn locals(&self) -> impl Iterator<Item = (Name, &Value)> {
        self.entries
            .iter()
            .filter_map(|(t, v)| Some((t.local()?, v)))
    }

    fn push(&mut self, target: BindTarget, value: Value) {
        self.entries.push((target, value));
    }

    fn mark(&self) -> usize {
        self.entries.len()
    }

    fn rollback(&mut self, mark: usize) {
        self.entries.truncate(mark);
    }
}

impl IntoIterator for Bindings {
    type Item = (BindTarget, Value);
    type IntoIter = smallvec::IntoIter<[(BindTarget, Value); 4]>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Result of matching one pattern against one value.
#[derive(Debug)]
pub enum MatchOutcome {
    Matched(Bindings),
    NotMatched,
    Errored(EvalError),
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched(_))
    }

    /// `Ok(Some)` on a match, `Ok(None)` on a non-match.
    pub fn into_result(self) -> Result<Option<Bindings>, EvalError> {
        match self {
            MatchOutcome::Matched(bindings) => Ok(Some(bindings)),
            MatchOutcome::NotMatched => Ok(None),
            MatchOutcome::Errored(error) => Err(error),
        }
    }
}

/// Matching state for one dispatch.
pub(crate) struct Matcher<'a, H: CaseHost + ?Sized> {
    host: &'a H,
    interner: &'a StringInterner,
    deconstructor: Deconstructor<'a, H>,
}

impl<'a, H: CaseHost + ?Sized> Matcher<'a, H> {
    pub(crate) fn new(host: &'a H, interner: &'a StringInterner, config: DispatchConfig) -> Self {
        Matcher {
            host,
            interner,
            deconstructor: Deconstructor::new(host, interner, config),
        }
    }

    pub(crate) fn stats(&self) -> DeconstructStats {
        self.deconstructor.stats()
    }

    /// Match `pattern` against `value` with fresh bindings.
    ///
    /// `env` is the enclosing scope: local pins fall back to it and pinned
    /// expressions are evaluated in it.
    pub(crate) fn match_pattern(
        &mut self,
        pattern: &MatchPattern,
        value: &Value,
        env: &mut Environment,
    ) -> MatchOutcome {
        let mut bindings = Bindings::new();
        match self.match_node(pattern, value, env, &mut bindings) {
            Ok(true) => MatchOutcome::Matched(bindings),
            Ok(false) => MatchOutcome::NotMatched,
            Err(error) => MatchOutcome::Errored(error),
        }
    }

    fn match_node(
        &mut self,
        pattern: &MatchPattern,
        value: &Value,
        env: &mut Environment,
        bindings: &mut Bindings,
    ) -> Result<bool, EvalError> {
        ensure_sufficient_stack(|| self.match_node_inner(pattern, value, env, bindings))
    }

    fn match_node_inner(
        &mut self,
        pattern: &MatchPattern,
        value: &Value,
        env: &mut Environment,
        bindings: &mut Bindings,
    ) -> Result<bool, EvalError> {
        match pattern {
            MatchPattern::Literal(literal) => self.host.case_eq(literal, value),

            MatchPattern::Binding(target) => {
                bindings.push(*target, value.clone());
                Ok(true)
            }

            MatchPattern::Wildcard | MatchPattern::NamedWildcard(_) => Ok(true),

            MatchPattern::Pin(reference) => {
                let pinned = self.resolve(reference, env, bindings)?;
                self.host.case_eq(&pinned, value)
            }

            MatchPattern::Or(branches) => {
                for branch in branches {
                    let mark = bindings.mark();
                    if self.match_node(branch, value, env, bindings)? {
                        return Ok(true);
                    }
                    bindings.rollback(mark);
                }
                Ok(false)
            }

            MatchPattern::At { pattern, target } => {
                if self.match_node(pattern, value, env, bindings)? {
                    bindings.push(*target, value.clone());
                    Ok(true)
                } else {
                    Ok(false)
                }
            }

            MatchPattern::Const { constant, inner } => {
                let constant = self.resolve(constant, env, bindings)?;
                if !self.host.case_eq(&constant, value)? {
                    return Ok(false);
                }
                match inner {
                    Some(inner) => self.match_node(inner, value, env, bindings),
                    None => Ok(true),
                }
            }

            MatchPattern::List(list) => self.match_list(list, value, env, bindings),

            MatchPattern::Hash(hash) => self.match_hash(hash, value, env, bindings),
        }
    }

    /// Match `patterns` pairwise against `items` (same length).
    fn match_each(
        &mut self,
        patterns: &[MatchPattern],
        items: &[Value],
        env: &mut Environment,
        bindings: &mut Bindings,
    ) -> Result<bool, EvalError> {
        debug_assert_eq!(patterns.len(), items.len());
        for (pattern, item) in patterns.iter().zip(items) {
            if !self.match_node(pattern, item, env, bindings)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Value of a pin or constant operand.
    ///
    /// A local or external name is looked up in this attempt's bindings
    /// first, then in the enclosing scope or the host. A pinned expression
    /// sees local bindings made so far.
    fn resolve(
        &self,
        reference: &ValueRef,
        env: &mut Environment,
        bindings: &Bindings,
    ) -> Result<Value, EvalError> {
        match reference {
            ValueRef::Local(name) => bindings
                .get(*name)
                .cloned()
                .or_else(|| env.lookup(*name))
                .ok_or_else(|| undefined_variable(self.interner.lookup(*name))),
            ValueRef::External(external) => match bindings.get(*external) {
                Some(value) => Ok(value.clone()),
                None => self.host.resolve_external(*external),
            },
            ValueRef::Expr(expr) => {
                let mut scoped = env.scoped();
                for (name, value) in bindings.locals() {
                    scoped.define(name, value.clone());
                }
                self.host.eval(*expr, &mut scoped)
            }
            ValueRef::Inline(value) => Ok(value.clone()),
        }
    }
}
