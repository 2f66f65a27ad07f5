//! Lifecycle protocols - the walks that move a controller tree between states.
//!
//! ```text
//! activate   parent first:   binding → bind → bound → mount → attaching → children → attached
//! deactivate children first: children → detaching → (initiator only) batched remove + unbind
//! dispose    children first: dispose hook → registry entry → sever
//! ```
//!
//! Every walk starts from a `Snapshot` taken under one short arena borrow.
//! The walk itself only touches the snapshot, so hooks, bindables and node
//! sequences run with the arena unborrowed and may call back into the engine.

mod activate;
mod deactivate;
mod dispose;

use std::rc::Rc;

use crate::binding::Bindable;
use crate::engine::{Controller, Hook, HookCapabilities, HookContext, Lifecycle, LifecycleHooks};
use crate::error::{CallbackError, LifecycleError};
use crate::pipeline::{MountTarget, NodeSequence};
use crate::scope::Scope;
use crate::types::{ControllerId, LifecycleFlags};

/// Everything a walk needs from one controller, cloned out of the arena.
pub(crate) struct Snapshot {
    pub(crate) id: ControllerId,
    pub(crate) name: String,
    pub(crate) capabilities: HookCapabilities,
    pub(crate) hooks: Rc<LifecycleHooks>,
    pub(crate) bindings: Vec<Rc<dyn Bindable>>,
    pub(crate) children: Vec<ControllerId>,
    pub(crate) parent: Option<ControllerId>,
    pub(crate) scope: Option<Rc<Scope>>,
    pub(crate) host_scope: Option<Rc<Scope>>,
    pub(crate) mount_target: MountTarget,
    pub(crate) nodes: Option<Rc<dyn NodeSequence>>,
    pub(crate) persistent_flags: LifecycleFlags,
}

impl Snapshot {
    pub(crate) fn of(controller: &Controller) -> Self {
        Self {
            id: controller.id,
            name: controller.name.clone(),
            capabilities: controller.capabilities,
            hooks: Rc::clone(&controller.hooks),
            bindings: controller.bindings.clone(),
            children: controller.children.clone(),
            parent: controller.parent,
            scope: controller.scope.clone(),
            host_scope: controller.host_scope.clone(),
            mount_target: controller.mount_target.clone(),
            nodes: controller.nodes.clone(),
            persistent_flags: controller.persistent_flags,
        }
    }

    pub(crate) fn has(&self, capability: HookCapabilities) -> bool {
        self.capabilities.contains(capability)
    }

    pub(crate) fn context(
        &self,
        lifecycle: &Lifecycle,
        initiator: ControllerId,
        flags: LifecycleFlags,
    ) -> HookContext {
        HookContext {
            lifecycle: lifecycle.clone(),
            controller: self.id,
            initiator,
            parent: self.parent,
            flags,
            scope: self.scope.clone(),
            host_scope: self.host_scope.clone(),
        }
    }

    pub(crate) fn hook_error(&self, hook: Hook, source: CallbackError) -> LifecycleError {
        hook_error(self.id, &self.name, hook, source)
    }

    pub(crate) fn binding_error(
        &self,
        position: usize,
        operation: &'static str,
        source: CallbackError,
    ) -> LifecycleError {
        LifecycleError::Binding {
            controller: self.id,
            name: self.name.clone(),
            position,
            operation,
            source,
        }
    }

    /// Run the synchronous `unbinding` hook, then unbind every binding in add order.
    pub(crate) fn unbind(
        &self,
        lifecycle: &Lifecycle,
        initiator: ControllerId,
        flags: LifecycleFlags,
    ) -> Result<(), LifecycleError> {
        let flags = flags | LifecycleFlags::FROM_UNBIND | self.persistent_flags;

        if self.has(HookCapabilities::UNBINDING) {
            if let Some(hook) = &self.hooks.unbinding {
                hook(&self.context(lifecycle, initiator, flags))
                    .map_err(|err| self.hook_error(Hook::Unbinding, err))?;
            }
        }

        for (position, bindable) in self.bindings.iter().enumerate() {
            tracing::trace!(controller = %self.id, position, "unbind");
            bindable
                .unbind(flags)
                .map_err(|err| self.binding_error(position, "unbind", err))?;
        }
        Ok(())
    }
}

/// Free-standing so a pending hook future can map its error without the snapshot.
pub(crate) fn hook_error(
    controller: ControllerId,
    name: &str,
    hook: Hook,
    source: CallbackError,
) -> LifecycleError {
    LifecycleError::Hook {
        controller,
        name: name.to_owned(),
        hook,
        source,
    }
}
