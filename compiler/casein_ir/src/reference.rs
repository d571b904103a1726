//! References to values stored outside the pattern's own bindings.

use crate::Name;

/// Storage class of an external reference.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ExternalKind {
    /// `@name`
    Instance,
    /// `@@name`
    Class,
    /// `$name`
    Global,
    /// `Name` / `Outer::Name`
    Constant,
}

impl ExternalKind {
    /// Source sigil used when rendering the reference.
    pub fn sigil(self) -> &'static str {
        match self {
            ExternalKind::Instance => "@",
            ExternalKind::Class => "@@",
            ExternalKind::Global => "$",
            ExternalKind::Constant => "",
        }
    }
}

/// A named reference the host resolves to a value.
///
/// The engine only needs "resolve this to a value"; where the value lives is
/// the host's business.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ExternalRef {
    pub kind: ExternalKind,
    pub name: Name,
}

impl ExternalRef {
    pub const fn new(kind: ExternalKind, name: Name) -> Self {
        ExternalRef { kind, name }
    }

    pub const fn instance(name: Name) -> Self {
        Self::new(ExternalKind::Instance, name)
    }

    pub const fn class(name: Name) -> Self {
        Self::new(ExternalKind::Class, name)
    }

    pub const fn global(name: Name) -> Self {
        Self::new(ExternalKind::Global, name)
    }

    pub const fn constant(name: Name) -> Self {
        Self::new(ExternalKind::Constant, name)
    }
}
