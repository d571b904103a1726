//! Range operands (`in 0..10`, `in ..0`, `in 1.5...`).

use std::cmp::Ordering;

use super::Value;

/// A range with optional bounds.
///
/// Bounds are compared with `Value::compare`, so numeric ranges accept both
/// integers and floats and string ranges compare lexicographically.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeValue {
    start: Option<Box<Value>>,
    end: Option<Box<Value>>,
    exclusive: bool,
}

impl RangeValue {
    /// `start..end`
    pub fn inclusive(start: Value, end: Value) -> Self {
        RangeValue::new(Some(start), Some(end), false)
    }

    /// `start...end`
    pub fn exclusive(start: Value, end: Value) -> Self {
        RangeValue::new(Some(start), Some(end), true)
    }

    /// General constructor; `None` is an open bound.
    pub fn new(start: Option<Value>, end: Option<Value>, exclusive: bool) -> Self {
        RangeValue {
            start: start.map(Box::new),
            end: end.map(Box::new),
            exclusive,
        }
    }

    pub fn start(&self) -> Option<&Value> {
        self.start.as_deref()
    }

    pub fn end(&self) -> Option<&Value> {
        self.end.as_deref()
    }

    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    /// Range membership (`range === value`). Incomparable values are outside.
    pub fn contains(&self, value: &Value) -> bool {
        let above_start = match self.start() {
            Some(start) => matches!(
                start.compare(value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            None => true,
        };
        if !above_start {
            return false;
        }
        match self.end() {
            Some(end) => match value.compare(end) {
                Some(Ordering::Less) => true,
                Some(Ordering::Equal) => !self.exclusive,
                _ => false,
            },
            // Beginless and endless: `value` must still be comparable with
            // the bound it has.
            None => self.start().is_some() || value.compare(value).is_some(),
        }
    }
}
