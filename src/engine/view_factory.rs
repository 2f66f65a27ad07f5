//! View Factory - creates synthetic views and pools released ones.
//!
//! Template controllers (`if`, `repeat`, ...) get a factory per template they
//! render. `create()` hands out a cached view when one is available and
//! hydrates a fresh synthetic view otherwise. A view that was `release()`d
//! goes back into the cache when its teardown pass unbinds it, or is disposed
//! when the cache is full.
//!
//! ```ignore
//! let factory = lifecycle.view_factory("todo-row", || ControllerProps {
//!     nodes: Some(render_row()),
//!     ..ControllerProps::synthetic("todo-row")
//! });
//! factory.set_cache_size(CacheSize::Bounded(16), false);
//!
//! let view = factory.create(&lifecycle)?;
//! lifecycle.set_mount_target(view, MountTarget::Location(anchor))?;
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::config::CacheSize;
use crate::error::{LifecycleError, LifecycleResult};
use crate::types::{ControllerId, ControllerKind};

use super::controller::ControllerProps;
use super::Lifecycle;

pub struct ViewFactory {
    name: String,
    template: Box<dyn Fn() -> ControllerProps>,
    cache_size: Cell<CacheSize>,
    size_set: Cell<bool>,
    cache: RefCell<Vec<ControllerId>>,
}

impl ViewFactory {
    /// A factory that does not cache until `set_cache_size` is called.
    pub fn new(name: impl Into<String>, template: impl Fn() -> ControllerProps + 'static) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            template: Box::new(template),
            cache_size: Cell::new(CacheSize::Disabled),
            size_set: Cell::new(false),
            cache: RefCell::new(Vec::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cache_size(&self) -> CacheSize {
        self.cache_size.get()
    }

    /// Change how many released views are kept.
    ///
    /// With `do_not_override_if_already_set`, a size chosen earlier (for
    /// example by the template author) wins over this call.
    pub fn set_cache_size(&self, size: CacheSize, do_not_override_if_already_set: bool) {
        if self.size_set.get() && do_not_override_if_already_set {
            return;
        }
        self.cache_size.set(size);
        self.size_set.set(true);
    }

    pub fn is_caching(&self) -> bool {
        self.cache_size.get().is_caching()
    }

    /// Number of views waiting in the cache.
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }

    /// A cached view, or a freshly hydrated one.
    pub fn create(self: &Rc<Self>, lifecycle: &Lifecycle) -> LifecycleResult<ControllerId> {
        if let Some(id) = self.cache.borrow_mut().pop() {
            tracing::trace!(factory = %self.name, controller = %id, "reusing cached view");
            return Ok(id);
        }

        let mut props = (self.template)();
        if props.kind != ControllerKind::SyntheticView {
            return Err(LifecycleError::NotSynthetic {
                factory: self.name.clone(),
                kind: props.kind,
            });
        }
        props.name = self.name.clone();

        let id = lifecycle.hydrate(props);
        lifecycle.assign_factory(id, Rc::clone(self))?;
        tracing::trace!(factory = %self.name, controller = %id, "created view");
        Ok(id)
    }

    /// Keep `id` for reuse if there is room.
    pub(crate) fn try_return_to_cache(&self, id: ControllerId) -> bool {
        let mut cache = self.cache.borrow_mut();
        if !self.cache_size.get().admits(cache.len()) || cache.contains(&id) {
            return false;
        }
        cache.push(id);
        true
    }

    /// Forget a view that is being disposed.
    pub(crate) fn evict(&self, id: ControllerId) {
        self.cache.borrow_mut().retain(|cached| *cached != id);
    }
}

impl fmt::Debug for ViewFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewFactory")
            .field("name", &self.name)
            .field("cache_size", &self.cache_size.get())
            .field("cached", &self.cached())
            .finish()
    }
}
