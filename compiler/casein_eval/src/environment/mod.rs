//! Variable scopes for the code around a `case/in`.
//!
//! Uses a scope stack (not cloning). Pattern variables need two operations
//! the host language's plain assignment does not give:
//! - `declare`: make a name exist (as `nil`) without touching a visible value
//! - `commit`: assign if visible anywhere, otherwise define in the current scope

// Rc is the intentional implementation detail of LocalScope<T>
#![expect(
    clippy::disallowed_types,
    reason = "Rc is the implementation of LocalScope<T>"
)]

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use casein_ir::Name;
use casein_patterns::Value;

/// Single-threaded, reference-counted scope cell.
///
/// All scope allocations go through `LocalScope::new()`.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

/// A single scope of variables.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    bindings: FxHashMap<Name, Value>,
    parent: Option<LocalScope<Scope>>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    pub fn with_parent(parent: LocalScope<Scope>) -> Self {
        Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    /// Define (or overwrite) a variable in this scope.
    #[inline]
    pub fn define(&mut self, name: Name, value: Value) {
        self.bindings.insert(name, value);
    }

    /// Look up a variable here or in any parent.
    #[inline]
    pub fn lookup(&self, name: Name) -> Option<Value> {
        if let Some(value) = self.bindings.get(&name) {
            return Some(value.clone());
        }
        if let Some(parent) = &self.parent {
            return parent.borrow().lookup(name);
        }
        None
    }

    /// Assign to the nearest scope that has `name`. Hands the value back
    /// when no scope does.
    #[inline]
    pub fn assign(&mut self, name: Name, value: Value) -> Result<(), Value> {
        if let Some(slot) = self.bindings.get_mut(&name) {
            *slot = value;
            return Ok(());
        }
        if let Some(parent) = &self.parent {
            return parent.borrow_mut().assign(name, value);
        }
        Err(value)
    }
}

/// Scope stack seen by the dispatcher and by host expressions.
pub struct Environment {
    /// Current scope at the top.
    scopes: Vec<LocalScope<Scope>>,
    /// Always at the bottom.
    global: LocalScope<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        let global = LocalScope::new(Scope::new());
        Environment {
            scopes: vec![global.clone()],
            global,
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    #[inline]
    pub fn push_scope(&mut self) {
        let parent = self.current_scope();
        self.scopes
            .push(LocalScope::new(Scope::with_parent(parent)));
    }

    /// Pop the current scope. The global scope is never popped.
    #[inline]
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Push a scope that is popped when the guard drops.
    pub fn scoped(&mut self) -> ScopedEnv<'_> {
        self.push_scope();
        ScopedEnv { env: self }
    }

    #[inline]
    fn current_scope(&self) -> LocalScope<Scope> {
        self.scopes.last().unwrap_or(&self.global).clone()
    }

    /// Define a variable in the current scope.
    #[inline]
    pub fn define(&mut self, name: Name, value: Value) {
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow_mut()
            .define(name, value);
    }

    #[inline]
    pub fn lookup(&self, name: Name) -> Option<Value> {
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow()
            .lookup(name)
    }

    pub fn is_defined(&self, name: Name) -> bool {
        self.lookup(name).is_some()
    }

    /// Assign to an existing variable; the value comes back if there is none.
    #[inline]
    pub fn assign(&mut self, name: Name, value: Value) -> Result<(), Value> {
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow_mut()
            .assign(name, value)
    }

    /// Make `name` exist. A visible variable keeps its value; otherwise
    /// `name` is defined as `nil` in the current scope.
    pub fn declare(&mut self, name: Name) {
        if !self.is_defined(name) {
            self.define(name, Value::Nil);
        }
    }

    /// Assign-or-define.
    pub fn commit(&mut self, name: Name, value: Value) {
        if let Err(value) = self.assign(name, value) {
            self.define(name, value);
        }
    }

    /// Every visible binding, innermost wins.
    pub fn capture(&self) -> FxHashMap<Name, Value> {
        fn collect(scope: &Scope, captures: &mut FxHashMap<Name, Value>) {
            for (name, value) in &scope.bindings {
                captures.entry(*name).or_insert_with(|| value.clone());
            }
            if let Some(parent) = &scope.parent {
                collect(&parent.borrow(), captures);
            }
        }
        let mut captures = FxHashMap::default();
        collect(&self.current_scope().borrow(), &mut captures);
        captures
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard from `Environment::scoped`; pops its scope on drop, including
/// during unwinding.
pub struct ScopedEnv<'env> {
    env: &'env mut Environment,
}

impl Drop for ScopedEnv<'_> {
    fn drop(&mut self) {
        self.env.pop_scope();
    }
}

impl Deref for ScopedEnv<'_> {
    type Target = Environment;

    fn deref(&self) -> &Self::Target {
        self.env
    }
}

impl DerefMut for ScopedEnv<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.env
    }
}
