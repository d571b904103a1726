//! The two deconstruction capabilities, answered as a tri-state.

use casein_ir::Name;

use super::{HashValue, Heap, Value};

/// Which capability a pattern asked for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `deconstruct`, for array and find patterns.
    Sequence,
    /// `deconstruct_keys`, for hash patterns.
    Mapping,
}

impl Capability {
    pub fn hook_name(self) -> &'static str {
        match self {
            Capability::Sequence => "deconstruct",
            Capability::Mapping => "deconstruct_keys",
        }
    }
}

/// How a capability call went wrong.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShapeError {
    /// `deconstruct` returned something other than an array.
    NotArray { got: &'static str },
    /// `deconstruct_keys` returned something other than a hash.
    NotHash { got: &'static str },
    /// `deconstruct_keys` answered a requested key with a non-symbol key.
    NonSymbolKey { key: String },
}

impl ShapeError {
    pub fn capability(&self) -> Capability {
        match self {
            ShapeError::NotArray { .. } => Capability::Sequence,
            ShapeError::NotHash { .. } | ShapeError::NonSymbolKey { .. } => Capability::Mapping,
        }
    }
}

/// Result of asking a value for one of its capabilities.
#[derive(Clone, Debug)]
pub enum Deconstructed<T> {
    Supported(T),
    /// The value does not expose the capability. Not an error.
    Unsupported,
    /// The capability ran and returned the wrong kind of value.
    WrongShape(ShapeError),
}

impl<T> Deconstructed<T> {
    pub fn is_supported(&self) -> bool {
        matches!(self, Deconstructed::Supported(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Deconstructed<U> {
        match self {
            Deconstructed::Supported(value) => Deconstructed::Supported(f(value)),
            Deconstructed::Unsupported => Deconstructed::Unsupported,
            Deconstructed::WrongShape(error) => Deconstructed::WrongShape(error),
        }
    }
}

impl Value {
    /// The value's own sequence capability.
    ///
    /// Arrays deconstruct to themselves; objects answer through their
    /// `deconstruct` hook; everything else is unsupported.
    pub fn deconstruct(&self) -> Deconstructed<Heap<Vec<Value>>> {
        match self {
            Value::Array(items) => Deconstructed::Supported(items.clone()),
            Value::Object(object) => match object.deconstruct_hook() {
                Some(hook) => match hook() {
                    Value::Array(items) => Deconstructed::Supported(items),
                    other => Deconstructed::WrongShape(ShapeError::NotArray {
                        got: other.type_name(),
                    }),
                },
                None => Deconstructed::Unsupported,
            },
            _ => Deconstructed::Unsupported,
        }
    }

    /// The value's own mapping capability.
    ///
    /// Hashes deconstruct to themselves and ignore `keys`; objects receive
    /// `keys` through their `deconstruct_keys` hook.
    pub fn deconstruct_keys(&self, keys: Option<&[Name]>) -> Deconstructed<Heap<HashValue>> {
        match self {
            Value::Hash(hash) => Deconstructed::Supported(hash.clone()),
            Value::Object(object) => match object.deconstruct_keys_hook() {
                Some(hook) => match hook(keys) {
                    Value::Hash(hash) => Deconstructed::Supported(hash),
                    other => Deconstructed::WrongShape(ShapeError::NotHash {
                        got: other.type_name(),
                    }),
                },
                None => Deconstructed::Unsupported,
            },
            _ => Deconstructed::Unsupported,
        }
    }
}
