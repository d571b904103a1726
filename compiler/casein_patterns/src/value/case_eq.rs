//! Case equality (`===`), the predicate behind literal, pin and constant
//! patterns.

use super::Value;

impl Value {
    /// `self === target`, with `self` as the pattern operand.
    ///
    /// - class: type membership
    /// - range: bound inclusion
    /// - regex: string or symbol text matches
    /// - proc: the predicate's answer
    /// - anything else: value equality
    ///
    /// Symbol text for regex matching needs the interner, so hosts that want
    /// `:sym in /re/` go through `case_eq_with`.
    pub fn case_eq(&self, target: &Value) -> bool {
        self.case_eq_with(target, |_| None)
    }

    /// `case_eq` with a resolver for symbol text.
    pub fn case_eq_with<'a>(
        &self,
        target: &'a Value,
        symbol_text: impl Fn(&'a Value) -> Option<&'a str>,
    ) -> bool {
        match self {
            Value::Class(class) => class.includes(target),
            Value::Range(range) => range.contains(target),
            Value::Regex(re) => match target {
                Value::Str(s) => re.is_match(s),
                Value::Symbol(_) => symbol_text(target).is_some_and(|text| re.is_match(text)),
                _ => false,
            },
            Value::Proc(predicate) => predicate(target),
            _ => self == target,
        }
    }
}
