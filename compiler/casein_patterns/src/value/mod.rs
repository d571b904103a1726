//! Runtime values seen by the pattern engine.
//!
//! # Heap Enforcement
//!
//! Heap payloads are created only through factory methods on `Value`
//! (`Value::string`, `Value::array`, `Value::hash`, ...). The `Heap<T>`
//! constructor is private to this module, which keeps identity semantics in
//! one place: cloning a `Value` shares its payload, and two clones report the
//! same `ValueId`.
//!
//! ```text
//! let list = Value::array(vec![Value::int(0), Value::int(1)]); // OK
//! let list = Value::Array(Heap::new(vec![]));                  // ERROR: private
//! ```

mod case_eq;
mod class;
mod deconstruct;
mod display;
mod hash;
mod heap;
mod object;
mod range;

use std::cmp::Ordering;
use std::fmt;

use casein_ir::Name;

pub use class::{BuiltinClass, ClassRef};
pub use deconstruct::{Capability, Deconstructed, ShapeError};
pub use display::ValueDisplay;
pub use hash::HashValue;
pub use heap::Heap;
pub use object::{KeysFn, KeysHook, ObjectValue, SequenceFn, SequenceHook};
pub use range::RangeValue;

/// Body of a predicate callable (`->(x) { ... }` used as a pattern).
pub type PredicateFn = dyn Fn(&Value) -> bool + Send + Sync;

/// Identity of a heap value, stable while any clone of the value is alive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(usize);

/// Runtime value.
#[derive(Clone)]
pub enum Value {
    // Immediates
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Interned symbol (`:name`); hash pattern keys are symbols.
    Symbol(Name),
    Range(RangeValue),
    Class(ClassRef),

    // Heap types
    Str(Heap<str>),
    Array(Heap<Vec<Value>>),
    Hash(Heap<HashValue>),
    Regex(Heap<regex::Regex>),
    /// Predicate callable; case equality calls it.
    Proc(Heap<PredicateFn>),
    /// Instance of a user class, optionally exposing deconstruction hooks.
    Object(Heap<ObjectValue>),
}

impl Value {
    // Factories

    #[inline]
    pub fn int(n: i64) -> Value {
        Value::Int(n)
    }

    #[inline]
    pub fn float(f: f64) -> Value {
        Value::Float(f)
    }

    #[inline]
    pub fn symbol(name: Name) -> Value {
        Value::Symbol(name)
    }

    pub fn string(s: impl AsRef<str>) -> Value {
        Value::Str(Heap::copy_from(s.as_ref()))
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Heap::new(items))
    }

    pub fn hash(hash: HashValue) -> Value {
        Value::Hash(Heap::new(hash))
    }

    /// Hash with symbol keys, in the given order.
    pub fn symbol_hash(pairs: impl IntoIterator<Item = (Name, Value)>) -> Value {
        Value::hash(
            pairs
                .into_iter()
                .map(|(k, v)| (Value::Symbol(k), v))
                .collect(),
        )
    }

    pub fn range(range: RangeValue) -> Value {
        Value::Range(range)
    }

    pub fn class(class: impl Into<ClassRef>) -> Value {
        Value::Class(class.into())
    }

    pub fn regex(re: regex::Regex) -> Value {
        Value::Regex(Heap::new(re))
    }

    /// Compile `pattern` into a regex value.
    pub fn try_regex(pattern: &str) -> Result<Value, regex::Error> {
        regex::Regex::new(pattern).map(Value::regex)
    }

    pub fn predicate(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Value {
        Value::Proc(Heap::predicate(f))
    }

    pub fn object(object: ObjectValue) -> Value {
        Value::Object(Heap::new(object))
    }

    // Accessors

    /// Ruby truthiness: everything except `nil` and `false`.
    #[inline]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<Name> {
        match self {
            Value::Symbol(name) => Some(*name),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&HashValue> {
        match self {
            Value::Hash(hash) => Some(&**hash),
            _ => None,
        }
    }

    /// Identity of heap values that can carry deconstruction state.
    ///
    /// Immediates and strings have no identity: they expose no hooks, so
    /// there is nothing to cache for them.
    pub fn identity(&self) -> Option<ValueId> {
        match self {
            Value::Array(items) => Some(ValueId(Heap::addr(items))),
            Value::Hash(hash) => Some(ValueId(Heap::addr(hash))),
            Value::Object(object) => Some(ValueId(Heap::addr(object))),
            _ => None,
        }
    }

    /// Class name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "NilClass",
            Value::Bool(true) => "TrueClass",
            Value::Bool(false) => "FalseClass",
            Value::Int(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Symbol(_) => "Symbol",
            Value::Range(_) => "Range",
            Value::Class(_) => "Class",
            Value::Str(_) => "String",
            Value::Array(_) => "Array",
            Value::Hash(_) => "Hash",
            Value::Regex(_) => "Regexp",
            Value::Proc(_) => "Proc",
            Value::Object(_) => "Object",
        }
    }

    /// Ordering for range membership: numbers with numbers, strings with
    /// strings. Anything else is incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Float(b)) => int_to_float(*a).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&int_to_float(*b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Str(a), Value::Str(b)) => Some((**a).cmp(&**b)),
            _ => None,
        }
    }

    /// Strict key equality (`eql?`): `1` and `1.0` are different hash keys.
    pub fn eql(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(_), Value::Float(_)) | (Value::Float(_), Value::Int(_)) => false,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.eql(y))
            }
            _ => self == other,
        }
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "mixed int/float comparison follows float semantics"
)]
fn int_to_float(n: i64) -> f64 {
    n as f64
}

impl PartialEq for Value {
    /// Value equality (`==`): structural for arrays and hashes, numeric across
    /// integers and floats, identity for procs and objects.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                self.compare(other) == Some(Ordering::Equal)
            }
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Range(a), Value::Range(b)) => a == b,
            (Value::Class(a), Value::Class(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => **a == **b,
            (Value::Array(a), Value::Array(b)) => Heap::ptr_eq(a, b) || a.as_slice() == b.as_slice(),
            (Value::Hash(a), Value::Hash(b)) => Heap::ptr_eq(a, b) || **a == **b,
            (Value::Regex(a), Value::Regex(b)) => a.as_str() == b.as_str(),
            (Value::Proc(a), Value::Proc(b)) => Heap::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Heap::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(x) => write!(f, "Float({x:?})"),
            Value::Symbol(name) => write!(f, "Symbol({name:?})"),
            Value::Range(r) => write!(f, "Range({r:?})"),
            Value::Class(c) => write!(f, "Class({c:?})"),
            Value::Str(s) => write!(f, "Str({:?})", &**s),
            Value::Array(items) => f.debug_tuple("Array").field(&**items).finish(),
            Value::Hash(hash) => f.debug_tuple("Hash").field(&**hash).finish(),
            Value::Regex(re) => write!(f, "Regex(/{}/)", re.as_str()),
            Value::Proc(_) => write!(f, "Proc"),
            Value::Object(object) => write!(f, "Object({:?})", object.class()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::array(iter.into_iter().collect())
    }
}
