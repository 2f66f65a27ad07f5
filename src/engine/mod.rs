//! Lifecycle Engine - controller arena, hydration API and inspection.
//!
//! The engine manages the core data structures:
//! - Arena: one `Controller` slot per `ControllerId`, never reused
//! - Registry: id allocation and view model → controller lookup
//! - Hooks: optional view-model callbacks and their capability set
//! - ViewFactory: synthetic view creation and caching
//!
//! # Architecture
//!
//! Controllers are NOT linked objects. They are slots in one arena, and the
//! tree is expressed with ids:
//!
//! ```text
//! #0: element  my-app    children=[#1, #3]  parent=None
//! #1: attribute if       children=[]        parent=#0   (manages #2)
//! #2: view     if-view   children=[]        parent=#1
//! #3: element  my-footer children=[]        parent=#0
//! ```
//!
//! A [`Lifecycle`] is a cheap, cloneable handle to that arena. Every borrow of
//! the arena is short and never spans a call into host code (hooks, bindables,
//! node sequences), so host code may call back into the engine at any time.

mod controller;
mod hooks;
mod registry;
mod view_factory;

pub use controller::ControllerProps;
pub use hooks::{
    AcceptHook, DeferredHook, DisposeHook, Hook, HookCapabilities, HookContext, LifecycleHooks,
    SyncHook,
};
pub use view_factory::ViewFactory;

pub(crate) use controller::Controller;

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::binding::Bindable;
use crate::config::EngineConfig;
use crate::error::{LifecycleError, LifecycleResult};
use crate::pipeline::{MountTarget, NodeRef};
use crate::scope::Scope;
use crate::types::{ControllerId, ControllerKind, State};

use registry::{ControllerRegistry, ViewModelKey};

// =============================================================================
// Arena
// =============================================================================

#[derive(Default)]
pub(crate) struct Arena {
    controllers: Vec<Controller>,
    registry: ControllerRegistry,
}

impl Arena {
    pub(crate) fn get(&self, id: ControllerId) -> LifecycleResult<&Controller> {
        self.controllers
            .get(id.0)
            .ok_or(LifecycleError::UnknownController(id))
    }

    pub(crate) fn get_mut(&mut self, id: ControllerId) -> LifecycleResult<&mut Controller> {
        self.controllers
            .get_mut(id.0)
            .ok_or(LifecycleError::UnknownController(id))
    }
}

pub(crate) fn invalid_transition(controller: &Controller, operation: &'static str) -> LifecycleError {
    LifecycleError::InvalidTransition {
        controller: controller.id,
        name: controller.name.clone(),
        operation,
        state: controller.state,
    }
}

// =============================================================================
// Lifecycle Handle
// =============================================================================

/// Handle to one controller tree and the engine that drives it.
#[derive(Clone, Default)]
pub struct Lifecycle {
    arena: Rc<RefCell<Arena>>,
    config: Rc<EngineConfig>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            arena: Rc::default(),
            config: Rc::new(config),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `f` against one controller. Never call host code inside `f`.
    pub(crate) fn read<R>(
        &self,
        id: ControllerId,
        f: impl FnOnce(&Controller) -> R,
    ) -> LifecycleResult<R> {
        let arena = self.arena.borrow();
        arena.get(id).map(f)
    }

    /// Mutate one controller. Never call host code inside `f`.
    pub(crate) fn write<R>(
        &self,
        id: ControllerId,
        f: impl FnOnce(&mut Controller) -> R,
    ) -> LifecycleResult<R> {
        let mut arena = self.arena.borrow_mut();
        arena.get_mut(id).map(f)
    }

    // =========================================================================
    // Hydration
    // =========================================================================

    /// Register a finished controller and return its id.
    pub fn hydrate(&self, props: ControllerProps) -> ControllerId {
        let mut arena = self.arena.borrow_mut();
        let id = arena.registry.allocate();
        if let Some(view_model) = &props.view_model {
            arena.registry.register(id, view_model);
        }

        let controller = Controller::new(id, props);
        tracing::debug!(
            controller = %id,
            name = %controller.name,
            kind = %controller.kind,
            capabilities = ?controller.capabilities,
            "hydrated controller"
        );
        debug_assert_eq!(arena.controllers.len(), id.0);
        arena.controllers.push(controller);
        id
    }

    /// Append a bindable. Only allowed before the first activation.
    pub fn add_binding(&self, id: ControllerId, bindable: Rc<dyn Bindable>) -> LifecycleResult<()> {
        let mut arena = self.arena.borrow_mut();
        let controller = arena.get_mut(id)?;
        if controller.state != State::NONE {
            return Err(invalid_transition(controller, "add a binding to"));
        }
        controller.bindings.push(bindable);
        Ok(())
    }

    /// Append an owned child. Only allowed before the parent's first activation.
    pub fn add_controller(&self, parent: ControllerId, child: ControllerId) -> LifecycleResult<()> {
        let mut arena = self.arena.borrow_mut();
        let child_state = arena.get(child)?.state;
        let controller = arena.get_mut(parent)?;
        if controller.state != State::NONE || child_state.is_disposed() || parent == child {
            return Err(invalid_transition(controller, "add a child to"));
        }
        if !controller.children.contains(&child) {
            controller.children.push(child);
        }
        Ok(())
    }

    pub(crate) fn assign_factory(&self, id: ControllerId, factory: Rc<ViewFactory>) -> LifecycleResult<()> {
        self.write(id, |controller| controller.factory = Some(factory))
    }

    /// Give a synthetic view a permanent scope that activation will not replace.
    pub fn lock_scope(&self, id: ControllerId, scope: Rc<Scope>) -> LifecycleResult<()> {
        let mut arena = self.arena.borrow_mut();
        let controller = arena.get_mut(id)?;
        if controller.kind != ControllerKind::SyntheticView
            || controller.is_active()
            || controller.state.is_disposed()
        {
            return Err(invalid_transition(controller, "lock the scope of"));
        }
        controller.scope = Some(scope);
        controller.scope_locked = true;
        Ok(())
    }

    /// Change where a controller mounts. Only allowed while it is not active.
    pub fn set_mount_target(&self, id: ControllerId, target: MountTarget) -> LifecycleResult<()> {
        let mut arena = self.arena.borrow_mut();
        let controller = arena.get_mut(id)?;
        let phase = controller.state.phase();
        if phase != State::NONE && phase != State::DEACTIVATED {
            return Err(invalid_transition(controller, "change the mount target of"));
        }
        controller.mount_target = target;
        Ok(())
    }

    /// Mark a controller so its teardown returns it to its factory cache (or
    /// disposes it) instead of keeping it around.
    pub fn release(&self, id: ControllerId) -> LifecycleResult<()> {
        self.write(id, |controller| {
            if !controller.state.is_disposed() {
                controller.state.insert(State::RELEASED);
            }
        })
    }

    /// A view factory using this engine's default cache size.
    pub fn view_factory(
        &self,
        name: impl Into<String>,
        template: impl Fn() -> ControllerProps + 'static,
    ) -> Rc<ViewFactory> {
        let factory = ViewFactory::new(name, template);
        factory.set_cache_size(self.config.default_view_cache_size, false);
        factory
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn state(&self, id: ControllerId) -> LifecycleResult<State> {
        self.read(id, |c| c.state)
    }

    /// False for unknown ids.
    pub fn is_active(&self, id: ControllerId) -> bool {
        self.read(id, |c| c.is_active()).unwrap_or(false)
    }

    pub fn parent(&self, id: ControllerId) -> LifecycleResult<Option<ControllerId>> {
        self.read(id, |c| c.parent)
    }

    pub fn children(&self, id: ControllerId) -> LifecycleResult<Vec<ControllerId>> {
        self.read(id, |c| c.children.clone())
    }

    pub fn scope(&self, id: ControllerId) -> LifecycleResult<Option<Rc<Scope>>> {
        self.read(id, |c| c.scope.clone())
    }

    pub fn name(&self, id: ControllerId) -> LifecycleResult<String> {
        self.read(id, |c| c.name.clone())
    }

    pub fn kind(&self, id: ControllerId) -> LifecycleResult<ControllerKind> {
        self.read(id, |c| c.kind)
    }

    pub fn capabilities(&self, id: ControllerId) -> LifecycleResult<HookCapabilities> {
        self.read(id, |c| c.capabilities)
    }

    pub fn mount_target(&self, id: ControllerId) -> LifecycleResult<MountTarget> {
        self.read(id, |c| c.mount_target.clone())
    }

    pub fn view_model(&self, id: ControllerId) -> LifecycleResult<Option<Rc<dyn Any>>> {
        self.read(id, |c| c.view_model.clone())
    }

    /// Binding targets among the controller's nodes.
    pub fn find_targets(&self, id: ControllerId) -> LifecycleResult<Vec<NodeRef>> {
        let nodes = self.read(id, |c| c.nodes.clone())?;
        Ok(nodes.map(|nodes| nodes.find_targets()).unwrap_or_default())
    }

    /// Whether the controller's declared resource name is `name`.
    pub fn is(&self, id: ControllerId, name: &str) -> bool {
        self.read(id, |c| c.name == name).unwrap_or(false)
    }

    /// The controller currently driving `view_model`.
    pub fn controller_for<T: ?Sized>(&self, view_model: &Rc<T>) -> Option<ControllerId> {
        self.arena.borrow().registry.lookup(ViewModelKey::of(view_model))
    }

    /// Number of controllers ever hydrated (disposed ones included).
    pub fn controller_count(&self) -> usize {
        self.arena.borrow().registry.capacity()
    }

    /// Number of view models currently mapped to a live controller.
    pub fn registered_view_models(&self) -> usize {
        self.arena.borrow().registry.len()
    }

    /// Drop the registry entry and everything but identity.
    pub(crate) fn retire(&self, id: ControllerId) -> LifecycleResult<()> {
        let mut arena = self.arena.borrow_mut();
        arena.registry.unregister(id);
        arena.get_mut(id)?.sever();
        Ok(())
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("controllers", &self.controller_count())
            .field("config", &self.config)
            .finish()
    }
}
