//! Activation - bind, mount and attach a subtree, parent first.

use std::rc::Rc;

use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;

use crate::config::InactiveParentPolicy;
use crate::deferred::{run_until_stalled, Deferred, Transition};
use crate::engine::{invalid_transition, Hook, HookCapabilities, Lifecycle};
use crate::error::{LifecycleError, LifecycleResult};
use crate::scope::Scope;
use crate::types::{ControllerId, ControllerKind, LifecycleFlags, State};

use super::{hook_error, Snapshot};

enum Entry {
    Skip,
    Proceed(Snapshot, Rc<Scope>),
}

fn same_scope(a: Option<&Rc<Scope>>, b: Option<&Rc<Scope>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

impl Lifecycle {
    /// Activate `id` and everything it owns.
    ///
    /// `initiator` is the controller whose deactivation will later tear this
    /// subtree down; pass `id` itself for a root. `parent` must be active (or
    /// absent), otherwise the call is skipped according to
    /// [`InactiveParentPolicy`].
    ///
    /// Returns `Deferred::Immediate` when no hook suspended. Otherwise the
    /// returned future drives the rest of the walk, and the controller stays
    /// `ACTIVATING` until it completes.
    ///
    /// # Errors
    ///
    /// The first hook or binding failure, unwrapped to the caller as soon as it
    /// happens. Nothing is rolled back.
    pub fn activate(
        &self,
        id: ControllerId,
        initiator: ControllerId,
        parent: Option<ControllerId>,
        flags: LifecycleFlags,
        scope: Option<Rc<Scope>>,
        host_scope: Option<Rc<Scope>>,
    ) -> Transition {
        let flags = flags | self.config().activation_flags();
        match self.enter_activation(id, parent, flags, scope, host_scope) {
            Ok(Entry::Proceed(snapshot, scope)) => run_until_stalled(
                self.clone()
                    .run_activation(snapshot, scope, initiator, flags)
                    .boxed_local(),
            ),
            Ok(Entry::Skip) => Deferred::done(),
            Err(err) => Deferred::failed(err),
        }
    }

    /// Guard, then move to `ACTIVATING` and adopt the scope.
    fn enter_activation(
        &self,
        id: ControllerId,
        parent: Option<ControllerId>,
        flags: LifecycleFlags,
        scope: Option<Rc<Scope>>,
        host_scope: Option<Rc<Scope>>,
    ) -> LifecycleResult<Entry> {
        let inactive_parent = match parent {
            Some(parent) => (!self.state(parent)?.is_active()).then_some(parent),
            None => None,
        };
        let policy = self.config().inactive_parent;

        self.write(id, |controller| {
            let phase = controller.state.phase();
            if phase == State::ACTIVATED {
                return Ok(Entry::Skip);
            }
            if phase == State::ACTIVATING {
                if same_scope(controller.supplied_scope.as_ref(), scope.as_ref()) {
                    return Ok(Entry::Skip);
                }
                return Err(invalid_transition(controller, "activate"));
            }
            if phase != State::NONE && phase != State::DEACTIVATED {
                return Err(invalid_transition(controller, "activate"));
            }

            if let Some(parent) = inactive_parent {
                return match policy {
                    InactiveParentPolicy::Ignore => {
                        tracing::warn!(
                            controller = %controller.id,
                            name = %controller.name,
                            parent = %parent,
                            "skipping activation under inactive parent"
                        );
                        Ok(Entry::Skip)
                    }
                    InactiveParentPolicy::Reject => Err(LifecycleError::InactiveParent {
                        controller: controller.id,
                        name: controller.name.clone(),
                        parent,
                    }),
                };
            }

            let effective = match controller.kind {
                ControllerKind::ElementComponent => controller.scope.clone(),
                ControllerKind::SyntheticView if controller.scope_locked => controller.scope.clone(),
                ControllerKind::AttributeComponent | ControllerKind::SyntheticView => scope.clone(),
            };
            let Some(effective) = effective else {
                return Err(LifecycleError::MissingScope {
                    controller: controller.id,
                    name: controller.name.clone(),
                });
            };

            if controller.kind == ControllerKind::ElementComponent {
                effective.set_parent(scope.clone());
            } else {
                controller.scope = Some(Rc::clone(&effective));
            }

            controller.state = State::ACTIVATING;
            controller.parent = parent;
            controller.supplied_scope = scope;
            controller.host_scope = host_scope;
            controller.persistent_flags = flags.persistent();

            tracing::debug!(
                controller = %controller.id,
                name = %controller.name,
                kind = %controller.kind,
                flags = ?flags,
                "activating"
            );
            Ok(Entry::Proceed(Snapshot::of(controller), effective))
        })?
    }

    async fn run_activation(
        self,
        snapshot: Snapshot,
        scope: Rc<Scope>,
        initiator: ControllerId,
        flags: LifecycleFlags,
    ) -> LifecycleResult<()> {
        let ctx = snapshot.context(&self, initiator, flags);

        if snapshot.has(HookCapabilities::BINDING) {
            if let Some(hook) = &snapshot.hooks.binding {
                hook(&ctx)
                    .resolve()
                    .await
                    .map_err(|err| snapshot.hook_error(Hook::Binding, err))?;
            }
        }

        let bind_flags = flags | LifecycleFlags::FROM_BIND;
        for (position, bindable) in snapshot.bindings.iter().enumerate() {
            tracing::trace!(controller = %snapshot.id, position, "bind");
            bindable
                .bind(bind_flags, &scope, snapshot.host_scope.as_ref())
                .map_err(|err| snapshot.binding_error(position, "bind", err))?;
        }

        if snapshot.has(HookCapabilities::BOUND) {
            if let Some(hook) = &snapshot.hooks.bound {
                hook(&ctx)
                    .resolve()
                    .await
                    .map_err(|err| snapshot.hook_error(Hook::Bound, err))?;
            }
        }

        if let Some(nodes) = &snapshot.nodes {
            tracing::trace!(
                controller = %snapshot.id,
                target = snapshot.mount_target.label(),
                "mount"
            );
            snapshot.mount_target.mount(nodes.as_ref());
        }

        // Children start while our own attaching may still be in flight.
        let mut pending: Vec<LocalBoxFuture<'static, LifecycleResult<()>>> = Vec::new();
        if snapshot.has(HookCapabilities::ATTACHING) {
            if let Some(hook) = &snapshot.hooks.attaching {
                match hook(&ctx) {
                    Deferred::Immediate(result) => {
                        result.map_err(|err| snapshot.hook_error(Hook::Attaching, err))?
                    }
                    Deferred::Pending(fut) => {
                        let (id, name) = (snapshot.id, snapshot.name.clone());
                        pending.push(
                            fut.map(move |result| {
                                result.map_err(|err| hook_error(id, &name, Hook::Attaching, err))
                            })
                            .boxed_local(),
                        );
                    }
                }
            }
        }

        for child in &snapshot.children {
            let transition = self.activate(
                *child,
                initiator,
                Some(snapshot.id),
                flags,
                Some(Rc::clone(&scope)),
                snapshot.host_scope.clone(),
            );
            match transition {
                Deferred::Immediate(result) => result?,
                Deferred::Pending(fut) => pending.push(fut),
            }
        }

        future::try_join_all(pending).await?;

        let settled = self.write(snapshot.id, |controller| {
            if controller.state.phase() != State::ACTIVATING {
                return false;
            }
            controller.state = State::ACTIVATED | controller.state.intersection(State::RELEASED);
            true
        })?;
        if !settled {
            tracing::debug!(controller = %snapshot.id, "activation superseded");
            return Ok(());
        }
        tracing::debug!(controller = %snapshot.id, name = %snapshot.name, "activated");

        if snapshot.has(HookCapabilities::ATTACHED) {
            if let Some(hook) = &snapshot.hooks.attached {
                hook(&ctx).map_err(|err| snapshot.hook_error(Hook::Attached, err))?;
            }
        }
        Ok(())
    }
}
