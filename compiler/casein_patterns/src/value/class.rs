//! Class references used by type-membership patterns (`in Integer`).

use casein_ir::{Name, StringLookup};

use super::Value;

/// Classes the value model knows natively.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinClass {
    /// Every value is an `Object`.
    Object,
    NilClass,
    TrueClass,
    FalseClass,
    /// `Integer` and `Float`.
    Numeric,
    Integer,
    Float,
    String,
    Symbol,
    Array,
    Hash,
    Range,
    Regexp,
    Proc,
    Class,
}

impl BuiltinClass {
    pub fn name(self) -> &'static str {
        match self {
            BuiltinClass::Object => "Object",
            BuiltinClass::NilClass => "NilClass",
            BuiltinClass::TrueClass => "TrueClass",
            BuiltinClass::FalseClass => "FalseClass",
            BuiltinClass::Numeric => "Numeric",
            BuiltinClass::Integer => "Integer",
            BuiltinClass::Float => "Float",
            BuiltinClass::String => "String",
            BuiltinClass::Symbol => "Symbol",
            BuiltinClass::Array => "Array",
            BuiltinClass::Hash => "Hash",
            BuiltinClass::Range => "Range",
            BuiltinClass::Regexp => "Regexp",
            BuiltinClass::Proc => "Proc",
            BuiltinClass::Class => "Class",
        }
    }

    fn includes(self, value: &Value) -> bool {
        match self {
            BuiltinClass::Object => true,
            BuiltinClass::NilClass => matches!(value, Value::Nil),
            BuiltinClass::TrueClass => matches!(value, Value::Bool(true)),
            BuiltinClass::FalseClass => matches!(value, Value::Bool(false)),
            BuiltinClass::Numeric => matches!(value, Value::Int(_) | Value::Float(_)),
            BuiltinClass::Integer => matches!(value, Value::Int(_)),
            BuiltinClass::Float => matches!(value, Value::Float(_)),
            BuiltinClass::String => matches!(value, Value::Str(_)),
            BuiltinClass::Symbol => matches!(value, Value::Symbol(_)),
            BuiltinClass::Array => matches!(value, Value::Array(_)),
            BuiltinClass::Hash => matches!(value, Value::Hash(_)),
            BuiltinClass::Range => matches!(value, Value::Range(_)),
            BuiltinClass::Regexp => matches!(value, Value::Regex(_)),
            BuiltinClass::Proc => matches!(value, Value::Proc(_)),
            BuiltinClass::Class => matches!(value, Value::Class(_)),
        }
    }
}

/// A class operand: builtin, or a user class identified by name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClassRef {
    Builtin(BuiltinClass),
    User(Name),
}

impl ClassRef {
    /// Type membership (`Class === value`).
    pub fn includes(self, value: &Value) -> bool {
        match self {
            ClassRef::Builtin(builtin) => builtin.includes(value),
            ClassRef::User(name) => match value {
                Value::Object(object) => object.is_a(name),
                _ => false,
            },
        }
    }

    pub fn name<'a>(self, lookup: &'a dyn StringLookup) -> &'a str {
        match self {
            ClassRef::Builtin(builtin) => builtin.name(),
            ClassRef::User(name) => lookup.lookup(name),
        }
    }
}

impl From<BuiltinClass> for ClassRef {
    fn from(builtin: BuiltinClass) -> Self {
        ClassRef::Builtin(builtin)
    }
}
