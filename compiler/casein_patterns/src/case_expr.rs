//! `case/in` expressions and the one-line `in` / `=>` forms.

use casein_ir::ExprId;

use crate::pattern::MatchPattern;

/// `if cond` / `unless cond` after an `in` clause.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Guard {
    /// `unless` rather than `if`.
    pub negated: bool,
    pub expr: ExprId,
}

impl Guard {
    pub fn when(expr: ExprId) -> Self {
        Guard {
            negated: false,
            expr,
        }
    }

    pub fn unless(expr: ExprId) -> Self {
        Guard {
            negated: true,
            expr,
        }
    }

    /// Whether the guard lets the arm through, given its condition's truthiness.
    #[inline]
    pub fn passes(self, truthy: bool) -> bool {
        truthy != self.negated
    }
}

/// One `in pattern [if guard] then body` clause.
#[derive(Clone, Debug, PartialEq)]
pub struct CaseArm {
    pub pattern: MatchPattern,
    pub guard: Option<Guard>,
    pub body: ExprId,
}

impl CaseArm {
    pub fn new(pattern: MatchPattern, body: ExprId) -> Self {
        CaseArm {
            pattern,
            guard: None,
            body,
        }
    }

    #[must_use]
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }
}

/// `case scrutinee in ... else ... end`
#[derive(Clone, Debug, PartialEq)]
pub struct CaseExpr {
    pub scrutinee: ExprId,
    pub arms: Vec<CaseArm>,
    pub else_body: Option<ExprId>,
}

impl CaseExpr {
    pub fn new(scrutinee: ExprId, arms: Vec<CaseArm>) -> Self {
        CaseExpr {
            scrutinee,
            arms,
            else_body: None,
        }
    }

    #[must_use]
    pub fn with_else(mut self, body: ExprId) -> Self {
        self.else_body = Some(body);
        self
    }
}

/// Which standalone form a one-line match uses.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OneLineMode {
    /// `expr in pattern`: evaluates to a boolean.
    Test,
    /// `expr => pattern`: raises on mismatch.
    Assert,
}

/// `expr in pattern` or `expr => pattern`.
#[derive(Clone, Debug, PartialEq)]
pub struct OneLineMatch {
    pub value: ExprId,
    pub pattern: MatchPattern,
    pub mode: OneLineMode,
}

impl OneLineMatch {
    pub fn test(value: ExprId, pattern: MatchPattern) -> Self {
        OneLineMatch {
            value,
            pattern,
            mode: OneLineMode::Test,
        }
    }

    pub fn assert(value: ExprId, pattern: MatchPattern) -> Self {
        OneLineMatch {
            value,
            pattern,
            mode: OneLineMode::Assert,
        }
    }
}
