//! User objects and their deconstruction hooks.

use std::fmt;

use casein_ir::Name;

use super::{Heap, Value};

/// `deconstruct`: expose the object as an ordered sequence.
pub type SequenceFn = dyn Fn() -> Value + Send + Sync;

/// `deconstruct_keys(keys)`: expose the object as a mapping. `None` asks for
/// every key; `Some(keys)` names the keys the pattern needs.
pub type KeysFn = dyn Fn(Option<&[Name]>) -> Value + Send + Sync;

pub type SequenceHook = Heap<SequenceFn>;
pub type KeysHook = Heap<KeysFn>;

/// Instance of a user class.
///
/// Hooks return arbitrary values: a hook that returns the wrong kind of
/// value is reported by the engine, not rejected here.
pub struct ObjectValue {
    class: Name,
    ancestors: Vec<Name>,
    deconstruct: Option<SequenceHook>,
    deconstruct_keys: Option<KeysHook>,
}

impl ObjectValue {
    /// An object of `class` with no deconstruction hooks.
    pub fn new(class: Name) -> Self {
        ObjectValue {
            class,
            ancestors: Vec::new(),
            deconstruct: None,
            deconstruct_keys: None,
        }
    }

    /// Add a superclass or included module for type-membership checks.
    #[must_use]
    pub fn with_ancestor(mut self, ancestor: Name) -> Self {
        self.ancestors.push(ancestor);
        self
    }

    #[must_use]
    pub fn with_deconstruct(mut self, hook: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.deconstruct = Some(Heap::sequence_hook(hook));
        self
    }

    #[must_use]
    pub fn with_deconstruct_keys(
        mut self,
        hook: impl Fn(Option<&[Name]>) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.deconstruct_keys = Some(Heap::keys_hook(hook));
        self
    }

    pub fn class(&self) -> Name {
        self.class
    }

    pub fn is_a(&self, class: Name) -> bool {
        self.class == class || self.ancestors.contains(&class)
    }

    pub fn deconstruct_hook(&self) -> Option<&SequenceFn> {
        self.deconstruct.as_deref()
    }

    pub fn deconstruct_keys_hook(&self) -> Option<&KeysFn> {
        self.deconstruct_keys.as_deref()
    }
}

impl fmt::Debug for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectValue")
            .field("class", &self.class)
            .field("deconstruct", &self.deconstruct.is_some())
            .field("deconstruct_keys", &self.deconstruct_keys.is_some())
            .finish_non_exhaustive()
    }
}
