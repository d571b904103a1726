//! Inspect-style rendering, used for `NoMatchingPatternError` messages.

use std::fmt;

use casein_ir::StringLookup;

use super::{RangeValue, Value};

/// Display adapter pairing a value with the interner its symbols came from.
pub struct ValueDisplay<'a> {
    value: &'a Value,
    lookup: &'a dyn StringLookup,
}

impl Value {
    /// Render like `inspect`: `[0, 1]`, `{a: 1, "k" => 2}`, `:sym`, `nil`.
    pub fn display<'a>(&'a self, lookup: &'a dyn StringLookup) -> ValueDisplay<'a> {
        ValueDisplay {
            value: self,
            lookup,
        }
    }
}

impl ValueDisplay<'_> {
    fn nested<'b>(&'b self, value: &'b Value) -> ValueDisplay<'b> {
        ValueDisplay {
            value,
            lookup: self.lookup,
        }
    }

    fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
        if x.is_nan() {
            write!(f, "NaN")
        } else if x.is_infinite() {
            write!(f, "{}Infinity", if x < 0.0 { "-" } else { "" })
        } else {
            // `{:?}` keeps the trailing `.0` on integral floats.
            write!(f, "{x:?}")
        }
    }

    fn write_range(&self, f: &mut fmt::Formatter<'_>, range: &RangeValue) -> fmt::Result {
        if let Some(start) = range.start() {
            write!(f, "{}", self.nested(start))?;
        }
        write!(f, "{}", if range.is_exclusive() { "..." } else { ".." })?;
        if let Some(end) = range.end() {
            write!(f, "{}", self.nested(end))?;
        }
        Ok(())
    }
}

impl fmt::Display for ValueDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => Self::write_float(f, *x),
            Value::Symbol(name) => write!(f, ":{}", self.lookup.lookup(*name)),
            Value::Range(range) => self.write_range(f, range),
            Value::Class(class) => write!(f, "{}", class.name(self.lookup)),
            Value::Str(s) => write!(f, "\"{}\"", s.escape_debug()),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", self.nested(item))?;
                }
                write!(f, "]")
            }
            Value::Hash(hash) => {
                if hash.is_empty() {
                    return write!(f, "{{}}");
                }
                write!(f, "{{")?;
                for (i, (key, value)) in hash.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match key {
                        Value::Symbol(name) => write!(f, "{}: ", self.lookup.lookup(*name))?,
                        other => write!(f, "{} => ", self.nested(other))?,
                    }
                    write!(f, "{}", self.nested(value))?;
                }
                write!(f, "}}")
            }
            Value::Regex(re) => write!(f, "/{}/", re.as_str()),
            Value::Proc(_) => write!(f, "#<Proc>"),
            Value::Object(object) => write!(f, "#<{}>", self.lookup.lookup(object.class())),
        }
    }
}
