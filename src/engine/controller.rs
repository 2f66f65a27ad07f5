//! Controller - the state-holding unit of the lifecycle tree.
//!
//! Controllers live in the arena of a [`Lifecycle`](super::Lifecycle) and are
//! addressed by [`ControllerId`]. A parent owns its children through their ids;
//! the `parent` field of a child is a plain id that is only set while the
//! child is active and is never used for ownership.

use std::any::Any;
use std::rc::Rc;

use crate::binding::Bindable;
use crate::pipeline::{MountTarget, NodeSequence};
use crate::scope::{BindingContext, Scope};
use crate::types::{ControllerId, ControllerKind, LifecycleFlags, State};

use super::hooks::{HookCapabilities, LifecycleHooks};
use super::view_factory::ViewFactory;

// =============================================================================
// Controller Props
// =============================================================================

/// Everything hydration hands to the engine for one controller.
///
/// ```ignore
/// let panel = lifecycle.hydrate(ControllerProps {
///     nodes: Some(rendered.clone()),
///     mount_target: MountTarget::Host(host_node),
///     hooks: LifecycleHooks::default().with_attached(|_| Ok(())),
///     ..ControllerProps::element("my-panel", view_model)
/// });
/// ```
#[derive(Default)]
pub struct ControllerProps {
    pub name: String,
    pub kind: ControllerKind,
    /// Instance identity used for `Lifecycle::controller_for`.
    pub view_model: Option<Rc<dyn Any>>,
    pub hooks: LifecycleHooks,
    pub nodes: Option<Rc<dyn NodeSequence>>,
    pub mount_target: MountTarget,
    /// Seed values of an element component's private scope.
    pub binding_context: Option<BindingContext>,
}

impl ControllerProps {
    pub fn element(name: impl Into<String>, view_model: Rc<dyn Any>) -> Self {
        Self {
            name: name.into(),
            kind: ControllerKind::ElementComponent,
            view_model: Some(view_model),
            ..Default::default()
        }
    }

    pub fn attribute(name: impl Into<String>, view_model: Rc<dyn Any>) -> Self {
        Self {
            name: name.into(),
            kind: ControllerKind::AttributeComponent,
            view_model: Some(view_model),
            ..Default::default()
        }
    }

    pub fn synthetic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ControllerKind::SyntheticView,
            ..Default::default()
        }
    }
}

// =============================================================================
// Controller Slot
// =============================================================================

pub(crate) struct Controller {
    pub(crate) id: ControllerId,
    pub(crate) name: String,
    pub(crate) kind: ControllerKind,
    pub(crate) state: State,
    pub(crate) capabilities: HookCapabilities,
    pub(crate) hooks: Rc<LifecycleHooks>,
    pub(crate) view_model: Option<Rc<dyn Any>>,

    pub(crate) bindings: Vec<Rc<dyn Bindable>>,
    pub(crate) children: Vec<ControllerId>,
    pub(crate) parent: Option<ControllerId>,

    /// The scope bindings evaluate against. Element components keep their
    /// private scope here for their whole lifetime.
    pub(crate) scope: Option<Rc<Scope>>,
    /// The scope supplied by the last `activate()` call.
    pub(crate) supplied_scope: Option<Rc<Scope>>,
    pub(crate) host_scope: Option<Rc<Scope>>,
    /// Synthetic views only: keep `scope` across activations.
    pub(crate) scope_locked: bool,

    pub(crate) mount_target: MountTarget,
    pub(crate) nodes: Option<Rc<dyn NodeSequence>>,

    pub(crate) persistent_flags: LifecycleFlags,
    /// On the initiator of an in-flight deactivation: every controller whose
    /// detaching has started, in call order.
    pub(crate) teardown_queue: Vec<ControllerId>,
    pub(crate) factory: Option<Rc<ViewFactory>>,
}

impl Controller {
    pub(crate) fn new(id: ControllerId, props: ControllerProps) -> Self {
        let ControllerProps {
            name,
            kind,
            view_model,
            hooks,
            nodes,
            mount_target,
            binding_context,
        } = props;

        let scope = match kind {
            ControllerKind::ElementComponent => {
                Some(Scope::boundary(binding_context.unwrap_or_default()))
            }
            ControllerKind::AttributeComponent | ControllerKind::SyntheticView => None,
        };

        Self {
            id,
            name,
            kind,
            state: State::NONE,
            capabilities: HookCapabilities::probe(&hooks),
            hooks: Rc::new(hooks),
            view_model,
            bindings: Vec::new(),
            children: Vec::new(),
            parent: None,
            scope,
            supplied_scope: None,
            host_scope: None,
            scope_locked: false,
            mount_target,
            nodes,
            persistent_flags: LifecycleFlags::NONE,
            teardown_queue: Vec::new(),
            factory: None,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Drop everything except identity, leaving a disposed tombstone.
    pub(crate) fn sever(&mut self) {
        self.state = State::DISPOSED;
        self.hooks = Rc::default();
        self.view_model = None;
        self.bindings.clear();
        self.children.clear();
        self.parent = None;
        self.scope = None;
        self.supplied_scope = None;
        self.host_scope = None;
        self.mount_target = MountTarget::None;
        self.nodes = None;
        self.teardown_queue.clear();
        self.factory = None;
    }
}
