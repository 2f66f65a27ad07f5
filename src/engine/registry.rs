//! Controller Registry - id allocation and view-model lookup.
//!
//! Manages the identity side of the arena:
//! - Sequential `ControllerId` allocation (ids are never recycled)
//! - View model ↔ controller bidirectional mapping
//!
//! The mapping is inserted when a controller is hydrated with a view model and
//! removed when that controller is disposed. It belongs to one
//! [`Lifecycle`](super::Lifecycle); there is no process-wide table.

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use crate::types::ControllerId;

// =============================================================================
// View Model Identity
// =============================================================================

/// Identity of a view model instance (its allocation address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ViewModelKey(usize);

impl ViewModelKey {
    pub(crate) fn of<T: ?Sized>(view_model: &Rc<T>) -> Self {
        ViewModelKey(Rc::as_ptr(view_model).cast::<()>() as usize)
    }
}

// =============================================================================
// Registry State
// =============================================================================

#[derive(Debug, Default)]
pub(crate) struct ControllerRegistry {
    /// Map view model identity to its controller.
    by_view_model: HashMap<ViewModelKey, ControllerId>,

    /// Map controller to the view model identity it was hydrated with.
    view_model_of: HashMap<ControllerId, ViewModelKey>,

    /// Next id to hand out.
    next_index: usize,
}

impl ControllerRegistry {
    /// Allocate the id for a new controller.
    pub(crate) fn allocate(&mut self) -> ControllerId {
        let id = ControllerId(self.next_index);
        self.next_index += 1;
        id
    }

    /// Record that `id` drives `view_model`.
    ///
    /// A view model hydrated twice keeps pointing at its latest controller.
    pub(crate) fn register(&mut self, id: ControllerId, view_model: &Rc<dyn Any>) {
        let key = ViewModelKey::of(view_model);
        if let Some(previous) = self.by_view_model.insert(key, id) {
            self.view_model_of.remove(&previous);
        }
        self.view_model_of.insert(id, key);
    }

    /// Drop the mapping for a disposed controller.
    pub(crate) fn unregister(&mut self, id: ControllerId) {
        if let Some(key) = self.view_model_of.remove(&id) {
            // Only remove if the view model still points at this controller
            if self.by_view_model.get(&key) == Some(&id) {
                self.by_view_model.remove(&key);
            }
        }
    }

    pub(crate) fn lookup(&self, key: ViewModelKey) -> Option<ControllerId> {
        self.by_view_model.get(&key).copied()
    }

    /// Number of view models currently mapped.
    pub(crate) fn len(&self) -> usize {
        self.by_view_model.len()
    }

    /// Total ids handed out so far.
    pub(crate) fn capacity(&self) -> usize {
        self.next_index
    }
}
