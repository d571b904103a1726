//! Pattern trees for `in` clauses.
//!
//! Trees are built once (by a parser or by hand) and never mutated while
//! matching. Nested patterns are owned (`Box` / `Vec`); a single clause is
//! small and short-lived, so there is no arena.

use casein_ir::{ExprId, ExternalRef, Name};

use crate::value::Value;

/// Where a pinned value or constant comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueRef {
    /// `^name`: a binding made earlier in the same pattern, else a variable
    /// visible in the enclosing scope.
    Local(Name),
    /// `^@ivar`, `^@@cvar`, `^$global`, or a constant like `Array`.
    External(ExternalRef),
    /// `^(expr)`: evaluated by the host each time the pin is reached.
    Expr(ExprId),
    /// A value known when the tree was built.
    Inline(Value),
}

/// Where a matched value is stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BindTarget {
    /// `name`: a local variable of the enclosing scope.
    Local(Name),
    /// `@ivar`, `@@cvar` or `$global`, written through the host on commit.
    External(ExternalRef),
}

impl BindTarget {
    pub fn local(self) -> Option<Name> {
        match self {
            BindTarget::Local(name) => Some(name),
            BindTarget::External(_) => None,
        }
    }
}

impl From<Name> for BindTarget {
    fn from(name: Name) -> Self {
        BindTarget::Local(name)
    }
}

impl From<ExternalRef> for BindTarget {
    fn from(reference: ExternalRef) -> Self {
        BindTarget::External(reference)
    }
}

/// Splat slot in an array or find pattern.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Splat {
    /// `*`
    Anonymous,
    /// `*name`, `*@ivar`
    Named(BindTarget),
}

impl Splat {
    pub fn target(self) -> Option<BindTarget> {
        match self {
            Splat::Anonymous => None,
            Splat::Named(target) => Some(target),
        }
    }
}

/// Fixed-width window of a find pattern: `[*before, q1, ..., qj, *after]`.
#[derive(Clone, Debug, PartialEq)]
pub struct FindWindow {
    pub before: Splat,
    pub elements: Vec<MatchPattern>,
    pub after: Splat,
}

/// Array pattern.
///
/// Exactly one of these shapes is populated:
/// - exact: `prefix` only
/// - rest: `prefix`, `rest`, `suffix`
/// - find: `find` only
/// - partial: `prefix` with `partial_tail` (`[a, b,]`)
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ArrayPattern {
    pub prefix: Vec<MatchPattern>,
    pub find: Option<FindWindow>,
    pub rest: Option<Splat>,
    pub suffix: Vec<MatchPattern>,
    pub partial_tail: bool,
}

impl ArrayPattern {
    /// `[p1, ..., pn]`
    pub fn exact(prefix: Vec<MatchPattern>) -> Self {
        ArrayPattern {
            prefix,
            ..ArrayPattern::default()
        }
    }

    /// `[p1, ..., *rest, s1, ..., sm]`
    pub fn with_rest(prefix: Vec<MatchPattern>, rest: Splat, suffix: Vec<MatchPattern>) -> Self {
        ArrayPattern {
            prefix,
            rest: Some(rest),
            suffix,
            ..ArrayPattern::default()
        }
    }

    /// `[*before, q1, ..., qj, *after]`
    pub fn find(before: Splat, elements: Vec<MatchPattern>, after: Splat) -> Self {
        ArrayPattern {
            find: Some(FindWindow {
                before,
                elements,
                after,
            }),
            ..ArrayPattern::default()
        }
    }

    /// `[p1, ..., pn,]`: trailing elements are ignored.
    pub fn partial(prefix: Vec<MatchPattern>) -> Self {
        ArrayPattern {
            prefix,
            partial_tail: true,
            ..ArrayPattern::default()
        }
    }

    /// Smallest sequence length this pattern can match.
    pub fn min_len(&self) -> usize {
        match &self.find {
            Some(window) => window.elements.len(),
            None => self.prefix.len() + self.suffix.len(),
        }
    }
}

/// Rest clause of a hash pattern.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum HashRest {
    /// No rest clause: extra keys are ignored.
    #[default]
    None,
    /// `**nil`: no keys beyond the named entries.
    Closed,
    /// `**`: extra keys explicitly ignored.
    Open,
    /// `**name`, `**$global`: extra pairs bound as a new hash.
    Named(BindTarget),
}

/// Hash pattern: `{a: p1, b: p2, **rest}`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct HashPattern {
    /// Symbol keys in source order. A key written without a value
    /// (`{a:}`) carries `Binding(a)`.
    pub entries: Vec<(Name, MatchPattern)>,
    pub rest: HashRest,
}

impl HashPattern {
    pub fn new(entries: Vec<(Name, MatchPattern)>, rest: HashRest) -> Self {
        HashPattern { entries, rest }
    }

    /// Keys passed to `deconstruct_keys`: `None` when a named rest needs
    /// every key, otherwise the entry keys in source order.
    pub fn requested_keys(&self) -> Option<Vec<Name>> {
        match self.rest {
            HashRest::Named(_) => None,
            HashRest::None | HashRest::Closed | HashRest::Open => {
                Some(self.entries.iter().map(|(key, _)| *key).collect())
            }
        }
    }
}

/// Pattern node.
#[derive(Clone, Debug, PartialEq)]
pub enum MatchPattern {
    /// Matches when `literal === value`.
    Literal(Value),
    /// `x`, `@x`, `$x`: always matches, binds.
    Binding(BindTarget),
    /// `_`
    Wildcard,
    /// `_name`: a discard that may repeat; binds nothing.
    NamedWildcard(Name),
    /// `^ref`
    Pin(ValueRef),
    /// `p1 | p2 | ...`: first matching branch wins.
    Or(Vec<MatchPattern>),
    /// `pattern => target`
    At {
        pattern: Box<MatchPattern>,
        target: BindTarget,
    },
    /// `Const`, `Const(...)`, `Const[...]`: `constant === value`, then the
    /// inner pattern if any.
    Const {
        constant: ValueRef,
        inner: Option<Box<MatchPattern>>,
    },
    List(ArrayPattern),
    Hash(HashPattern),
}

impl MatchPattern {
    pub fn literal(value: impl Into<Value>) -> Self {
        MatchPattern::Literal(value.into())
    }

    pub fn binding(target: impl Into<BindTarget>) -> Self {
        MatchPattern::Binding(target.into())
    }

    pub fn pin(name: Name) -> Self {
        MatchPattern::Pin(ValueRef::Local(name))
    }

    pub fn at(pattern: MatchPattern, target: impl Into<BindTarget>) -> Self {
        MatchPattern::At {
            pattern: Box::new(pattern),
            target: target.into(),
        }
    }

    /// `Const(inner)` with an inline constant.
    pub fn constant(constant: impl Into<Value>, inner: Option<MatchPattern>) -> Self {
        MatchPattern::Const {
            constant: ValueRef::Inline(constant.into()),
            inner: inner.map(Box::new),
        }
    }

    /// Local names this pattern can bind, left to right, depth first.
    ///
    /// Discards and external targets are excluded. Alternation branches are
    /// walked too; upstream validation keeps them binding-free.
    pub fn binding_names(&self) -> Vec<Name> {
        let mut targets = Vec::new();
        self.collect_targets(&mut targets);
        targets.into_iter().filter_map(BindTarget::local).collect()
    }

    fn collect_targets(&self, out: &mut Vec<BindTarget>) {
        match self {
            MatchPattern::Binding(target) => out.push(*target),
            MatchPattern::Literal(_)
            | MatchPattern::Wildcard
            | MatchPattern::NamedWildcard(_)
            | MatchPattern::Pin(_) => {}
            MatchPattern::Or(branches) => {
                for branch in branches {
                    branch.collect_targets(out);
                }
            }
            MatchPattern::At { pattern, target } => {
                pattern.collect_targets(out);
                out.push(*target);
            }
            MatchPattern::Const { inner, .. } => {
                if let Some(inner) = inner {
                    inner.collect_targets(out);
                }
            }
            MatchPattern::List(list) => {
                for p in &list.prefix {
                    p.collect_targets(out);
                }
                if let Some(window) = &list.find {
                    out.extend(window.before.target());
                    for p in &window.elements {
                        p.collect_targets(out);
                    }
                    out.extend(window.after.target());
                }
                if let Some(rest) = list.rest {
                    out.extend(rest.target());
                }
                for p in &list.suffix {
                    p.collect_targets(out);
                }
            }
            MatchPattern::Hash(hash) => {
                for (_, p) in &hash.entries {
                    p.collect_targets(out);
                }
                if let HashRest::Named(target) = hash.rest {
                    out.push(target);
                }
            }
        }
    }
}

impl From<ArrayPattern> for MatchPattern {
    fn from(list: ArrayPattern) -> Self {
        MatchPattern::List(list)
    }
}

impl From<HashPattern> for MatchPattern {
    fn from(hash: HashPattern) -> Self {
        MatchPattern::Hash(hash)
    }
}
