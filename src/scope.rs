//! Scope - the binding-context graph that bindings read from and write to.
//!
//! A scope pairs a binding context (the view model's values) with an override
//! context (values injected by the template, such as loop locals) and an
//! optional parent link. Contexts hold one `Signal` per name, so bindings that
//! read through a scope inside an effect react to later assignments.
//!
//! # Ownership
//!
//! Scopes are shared by reference (`Rc<Scope>`) across a whole subtree. Only
//! the controller that owns a scope rebinds its parent link; children never
//! write to an ancestor's scope structure (they may still assign values).
//!
//! # Lookup
//!
//! ```text
//! ancestor == 0:  walk up until a scope defines the name (override context
//!                 first, then binding context), stopping at the first
//!                 boundary unless ALLOW_PARENT_SCOPE_TRAVERSAL is set.
//! ancestor == n:  jump exactly n parents ($parent.$parent...), no search.
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use spark_signals::{signal, Signal};

use crate::types::LifecycleFlags;

// =============================================================================
// Scope Value
// =============================================================================

/// A value stored in a binding context.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScopeValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<bool> for ScopeValue {
    fn from(value: bool) -> Self {
        ScopeValue::Bool(value)
    }
}

impl From<f64> for ScopeValue {
    fn from(value: f64) -> Self {
        ScopeValue::Number(value)
    }
}

impl From<i32> for ScopeValue {
    fn from(value: i32) -> Self {
        ScopeValue::Number(f64::from(value))
    }
}

impl From<&str> for ScopeValue {
    fn from(value: &str) -> Self {
        ScopeValue::Text(value.to_string())
    }
}

impl From<String> for ScopeValue {
    fn from(value: String) -> Self {
        ScopeValue::Text(value)
    }
}

// =============================================================================
// Binding Context
// =============================================================================

/// A bag of named reactive values.
#[derive(Default)]
pub struct BindingContext {
    values: RefCell<HashMap<String, Signal<ScopeValue>>>,
}

impl BindingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, for seeding a context at hydration time.
    pub fn with(self, name: &str, value: impl Into<ScopeValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.borrow().contains_key(name)
    }

    /// Read a value. Inside an effect this subscribes to the name.
    pub fn get(&self, name: &str) -> Option<ScopeValue> {
        let sig = self.values.borrow().get(name).cloned();
        sig.map(|s| s.get())
    }

    /// The signal behind a name, for bindings that observe it directly.
    pub fn signal(&self, name: &str) -> Option<Signal<ScopeValue>> {
        self.values.borrow().get(name).cloned()
    }

    /// Write a value, creating the signal on first assignment.
    pub fn set(&self, name: &str, value: impl Into<ScopeValue>) {
        let value = value.into();
        let existing = self.values.borrow().get(name).cloned();
        match existing {
            // Set outside the borrow: subscribers may read this context again.
            Some(sig) => {
                sig.set(value);
            }
            None => {
                self.values.borrow_mut().insert(name.to_string(), signal(value));
            }
        }
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.values.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

// =============================================================================
// Scope
// =============================================================================

/// Which context of a scope a name resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Override,
    Binding,
}

pub struct Scope {
    parent: RefCell<Option<Rc<Scope>>>,
    binding_context: BindingContext,
    override_context: BindingContext,
    is_boundary: bool,
}

impl Scope {
    /// A root scope with no parent.
    pub fn new(binding_context: BindingContext) -> Rc<Scope> {
        Rc::new(Scope {
            parent: RefCell::new(None),
            binding_context,
            override_context: BindingContext::new(),
            is_boundary: false,
        })
    }

    /// A boundary scope. Element components own one of these; lookups from
    /// inside the element do not leak into the surrounding template.
    pub fn boundary(binding_context: BindingContext) -> Rc<Scope> {
        Rc::new(Scope {
            parent: RefCell::new(None),
            binding_context,
            override_context: BindingContext::new(),
            is_boundary: true,
        })
    }

    /// A non-boundary scope chained under `parent`.
    pub fn child(parent: &Rc<Scope>, binding_context: BindingContext) -> Rc<Scope> {
        Rc::new(Scope {
            parent: RefCell::new(Some(Rc::clone(parent))),
            binding_context,
            override_context: BindingContext::new(),
            is_boundary: false,
        })
    }

    pub fn parent(&self) -> Option<Rc<Scope>> {
        self.parent.borrow().clone()
    }

    /// Rebind the parent link. Only the owning controller calls this.
    pub(crate) fn set_parent(&self, parent: Option<Rc<Scope>>) {
        *self.parent.borrow_mut() = parent;
    }

    pub fn is_boundary(&self) -> bool {
        self.is_boundary
    }

    pub fn binding_context(&self) -> &BindingContext {
        &self.binding_context
    }

    pub fn override_context(&self) -> &BindingContext {
        &self.override_context
    }

    fn context(&self, kind: ContextKind) -> &BindingContext {
        match kind {
            ContextKind::Override => &self.override_context,
            ContextKind::Binding => &self.binding_context,
        }
    }

    fn defines(&self, name: &str) -> Option<ContextKind> {
        if self.override_context.has(name) {
            Some(ContextKind::Override)
        } else if self.binding_context.has(name) {
            Some(ContextKind::Binding)
        } else {
            None
        }
    }

    /// Find the scope and context that hold `name`.
    ///
    /// Returns `None` when nothing in reach defines the name.
    pub fn resolve(
        self: &Rc<Self>,
        name: &str,
        ancestor: usize,
        flags: LifecycleFlags,
    ) -> Option<(Rc<Scope>, ContextKind)> {
        if ancestor > 0 {
            let mut current = Rc::clone(self);
            for _ in 0..ancestor {
                current = current.parent()?;
            }
            let kind = current.defines(name)?;
            return Some((current, kind));
        }

        let traverse_boundaries = flags.contains(LifecycleFlags::ALLOW_PARENT_SCOPE_TRAVERSAL);
        let mut current = Rc::clone(self);
        loop {
            if let Some(kind) = current.defines(name) {
                return Some((current, kind));
            }
            if current.is_boundary && !traverse_boundaries {
                return None;
            }
            current = current.parent()?;
        }
    }

    /// Read `name` through the scope chain.
    pub fn get(self: &Rc<Self>, name: &str, ancestor: usize, flags: LifecycleFlags) -> Option<ScopeValue> {
        let (scope, kind) = self.resolve(name, ancestor, flags)?;
        scope.context(kind).get(name)
    }

    /// Assign `name` where it is defined, or on this scope's binding context
    /// when nothing in reach defines it.
    pub fn assign(self: &Rc<Self>, name: &str, value: impl Into<ScopeValue>, flags: LifecycleFlags) {
        match self.resolve(name, 0, flags) {
            Some((scope, kind)) => scope.context(kind).set(name, value),
            None => self.binding_context.set(name, value),
        }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("binding_context", &self.binding_context.names())
            .field("override_context", &self.override_context.names())
            .field("is_boundary", &self.is_boundary)
            .field("has_parent", &self.parent.borrow().is_some())
            .finish()
    }
}
