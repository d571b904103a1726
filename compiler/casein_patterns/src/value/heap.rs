//! Shared heap payloads for `Value`.

// Heap<T> is the one place value payloads are reference counted.
#![expect(clippy::disallowed_types, reason = "Heap<T> is the Arc wrapper")]

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use super::{KeysFn, PredicateFn, SequenceFn, Value};
use casein_ir::Name;

/// Reference-counted payload of a heap `Value`.
///
/// The constructor is private to the `value` module, so every heap value is
/// created through a `Value` factory. Cloning a `Heap` shares the payload and
/// keeps its identity.
#[repr(transparent)]
pub struct Heap<T: ?Sized>(Arc<T>);

impl<T> Heap<T> {
    #[inline]
    pub(super) fn new(value: T) -> Self {
        Heap(Arc::new(value))
    }
}

impl<T: ?Sized> Heap<T> {
    /// Whether two handles share one allocation.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }

    /// Address of the shared allocation, used as the value's identity.
    #[inline]
    pub(super) fn addr(this: &Self) -> usize {
        Arc::as_ptr(&this.0).cast::<()>() as usize
    }
}

impl<T: ?Sized> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl Heap<str> {
    #[inline]
    pub(super) fn copy_from(s: &str) -> Self {
        Heap(Arc::from(s))
    }
}

impl Heap<PredicateFn> {
    pub(super) fn predicate(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Heap(Arc::new(f))
    }
}

impl Heap<SequenceFn> {
    pub(super) fn sequence_hook(f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Heap(Arc::new(f))
    }
}

impl Heap<KeysFn> {
    pub(super) fn keys_hook(
        f: impl Fn(Option<&[Name]>) -> Value + Send + Sync + 'static,
    ) -> Self {
        Heap(Arc::new(f))
    }
}
