//! `case/in` dispatch and the one-line `in` / `=>` forms.
//!
//! One dispatch per evaluation:
//! 1. evaluate the scrutinee once
//! 2. declare every arm's binding names (`nil` unless already visible)
//! 3. try arms in order; a match runs the guard in a temporary scope holding
//!    the arm's bindings
//! 4. a passing guard commits the bindings and evaluates the body
//! 5. otherwise `else`, or `NoMatchingPatternError`
//!
//! Deconstruction answers are shared by every arm of the dispatch.

mod builder;

use casein_ir::{ExprId, StringInterner};
use casein_patterns::errors::no_matching_pattern;
use casein_patterns::{
    BindTarget, CaseExpr, EvalError, EvalResult, Guard, MatchPattern, OneLineMatch, OneLineMode,
    Value,
};

pub use builder::CaseEvaluatorBuilder;

use crate::config::DispatchConfig;
use crate::host::CaseHost;
use crate::matcher::{Bindings, MatchOutcome, Matcher};
use crate::Environment;

/// Evaluates `case/in` expressions against a host.
pub struct CaseEvaluator<'a, H: CaseHost + ?Sized> {
    host: &'a H,
    interner: &'a StringInterner,
    config: DispatchConfig,
}

impl<'a, H: CaseHost + ?Sized> CaseEvaluator<'a, H> {
    /// Evaluator with the default configuration.
    pub fn new(interner: &'a StringInterner, host: &'a H) -> Self {
        CaseEvaluatorBuilder::new(interner, host).build()
    }

    pub fn builder(interner: &'a StringInterner, host: &'a H) -> CaseEvaluatorBuilder<'a, H> {
        CaseEvaluatorBuilder::new(interner, host)
    }

    pub fn config(&self) -> DispatchConfig {
        self.config
    }

    /// Evaluate `case scrutinee in ... end`.
    #[tracing::instrument(level = "debug", skip_all, fields(arms = case.arms.len()))]
    pub fn eval_case(&self, case: &CaseExpr, env: &mut Environment) -> EvalResult {
        let scrutinee = self.host.eval(case.scrutinee, env)?;
        for arm in &case.arms {
            declare_names(&arm.pattern, env);
        }

        let mut matcher = self.matcher();
        for (index, arm) in case.arms.iter().enumerate() {
            let bindings = match matcher.match_pattern(&arm.pattern, &scrutinee, env) {
                MatchOutcome::Matched(bindings) => bindings,
                MatchOutcome::NotMatched => {
                    tracing::trace!(index, "arm did not match");
                    continue;
                }
                MatchOutcome::Errored(error) => {
                    tracing::debug!(index, code = error.kind.error_code(), "dispatch aborted");
                    return Err(error);
                }
            };
            if let Some(guard) = arm.guard {
                if !self.guard_passes(guard, &bindings, env)? {
                    tracing::trace!(index, "guard rejected arm");
                    continue;
                }
            }
            let stats = matcher.stats();
            tracing::debug!(
                index,
                bound = bindings.len(),
                hook_calls = stats.hook_calls(),
                cache_hits = stats.cache_hits,
                "arm matched"
            );
            self.commit(bindings, env)?;
            return self.host.eval(arm.body, env);
        }

        let stats = matcher.stats();
        tracing::debug!(
            hook_calls = stats.hook_calls(),
            cache_hits = stats.cache_hits,
            "no arm matched"
        );
        match case.else_body {
            Some(body) => self.host.eval(body, env),
            None => Err(self.no_match(&scrutinee)),
        }
    }

    /// Evaluate a standalone `expr in pattern` or `expr => pattern`.
    pub fn eval_one_line(&self, one_line: &OneLineMatch, env: &mut Environment) -> EvalResult {
        match one_line.mode {
            OneLineMode::Test => self.eval_in(one_line.value, &one_line.pattern, env),
            OneLineMode::Assert => self.eval_rightward(one_line.value, &one_line.pattern, env),
        }
    }

    /// `expr in pattern`: `true` (bindings committed) or `false`.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn eval_in(
        &self,
        value: ExprId,
        pattern: &MatchPattern,
        env: &mut Environment,
    ) -> EvalResult {
        let (_, matched) = self.match_one_line(value, pattern, env)?;
        Ok(Value::Bool(matched))
    }

    /// `expr => pattern`: `nil` (bindings committed), or
    /// `NoMatchingPatternError`.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn eval_rightward(
        &self,
        value: ExprId,
        pattern: &MatchPattern,
        env: &mut Environment,
    ) -> EvalResult {
        match self.match_one_line(value, pattern, env)? {
            (_, true) => Ok(Value::Nil),
            (value, false) => Err(self.no_match(&value)),
        }
    }

    /// Match an already-evaluated value with fresh deconstruction state.
    /// Bindings are returned, not committed.
    pub fn match_value(
        &self,
        pattern: &MatchPattern,
        value: &Value,
        env: &mut Environment,
    ) -> MatchOutcome {
        self.matcher().match_pattern(pattern, value, env)
    }

    fn match_one_line(
        &self,
        value: ExprId,
        pattern: &MatchPattern,
        env: &mut Environment,
    ) -> Result<(Value, bool), EvalError> {
        let value = self.host.eval(value, env)?;
        declare_names(pattern, env);
        match self.match_value(pattern, &value, env).into_result()? {
            Some(bindings) => {
                self.commit(bindings, env)?;
                Ok((value, true))
            }
            None => Ok((value, false)),
        }
    }

    fn matcher(&self) -> Matcher<'a, H> {
        Matcher::new(self.host, self.interner, self.config)
    }

    fn guard_passes(
        &self,
        guard: Guard,
        bindings: &Bindings,
        env: &mut Environment,
    ) -> Result<bool, EvalError> {
        let mut scoped = env.scoped();
        for (name, value) in bindings.locals() {
            scoped.define(name, value.clone());
        }
        let condition = self.host.eval(guard.expr, &mut scoped)?;
        Ok(guard.passes(condition.is_truthy()))
    }

    /// Locals go to the enclosing scope; `@ivar`, `@@cvar` and `$global`
    /// targets go through the host.
    fn commit(&self, bindings: Bindings, env: &mut Environment) -> Result<(), EvalError> {
        for (target, value) in bindings {
            match target {
                BindTarget::Local(name) => env.commit(name, value),
                BindTarget::External(reference) => {
                    tracing::trace!(?reference, "assigning external binding");
                    self.host.assign_external(reference, value)?;
                }
            }
        }
        Ok(())
    }

    #[cold]
    fn no_match(&self, scrutinee: &Value) -> EvalError {
        no_matching_pattern(self.host.render(scrutinee, self.interner))
    }
}

fn declare_names(pattern: &MatchPattern, env: &mut Environment) {
    for name in pattern.binding_names() {
        env.declare(name);
    }
}
