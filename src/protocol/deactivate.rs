//! Deactivation - detach a subtree children first, then tear it down in one pass.
//!
//! Every controller whose `detaching` hook starts is appended to the
//! initiator's teardown queue. Only the initiator drains that queue, and only
//! after every queued `detaching` has settled:
//!
//! ```text
//! C1.detaching  C2.detaching  P.detaching       (queue: C1, C2, P)
//!                        ... all settle ...
//! C1: remove, unlink, unbinding, unbind*
//! C2: remove, unlink, unbinding, unbind*
//! P:  remove, unlink, unbinding, unbind*
//! C1, C2, P → DEACTIVATED
//! ```

use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;

use crate::deferred::{run_until_stalled, Deferred, Transition};
use crate::engine::{Hook, HookCapabilities, Lifecycle};
use crate::error::LifecycleResult;
use crate::types::{ControllerId, ControllerKind, LifecycleFlags, State};

use super::{hook_error, Snapshot};

impl Lifecycle {
    /// Deactivate `id` and everything it owns.
    ///
    /// A no-op unless the controller is `ACTIVATED`. When `id` is not the
    /// initiator, the returned transition only covers `detaching` of this
    /// subtree; removal and unbinding happen when the initiator drains its
    /// queue.
    pub fn deactivate(
        &self,
        id: ControllerId,
        initiator: ControllerId,
        parent: Option<ControllerId>,
        flags: LifecycleFlags,
    ) -> Transition {
        match self.enter_deactivation(id, initiator, parent) {
            Ok(Some(snapshot)) => run_until_stalled(
                self.clone()
                    .run_deactivation(snapshot, initiator, flags)
                    .boxed_local(),
            ),
            Ok(None) => Deferred::done(),
            Err(err) => Deferred::failed(err),
        }
    }

    fn enter_deactivation(
        &self,
        id: ControllerId,
        initiator: ControllerId,
        parent: Option<ControllerId>,
    ) -> LifecycleResult<Option<Snapshot>> {
        if initiator != id {
            self.read(initiator, |_| ())?;
        }

        self.write(id, |controller| {
            if controller.state.phase() != State::ACTIVATED {
                return None;
            }
            controller.state = State::DEACTIVATING | controller.state.intersection(State::RELEASED);
            if controller.id == initiator {
                controller.teardown_queue.clear();
            }

            tracing::debug!(
                controller = %controller.id,
                name = %controller.name,
                initiator = %initiator,
                "deactivating"
            );
            let mut snapshot = Snapshot::of(controller);
            snapshot.parent = parent.or(snapshot.parent);
            Some(snapshot)
        })
    }

    async fn run_deactivation(
        self,
        snapshot: Snapshot,
        initiator: ControllerId,
        flags: LifecycleFlags,
    ) -> LifecycleResult<()> {
        let walked = self.walk_deactivation(&snapshot, initiator, flags).await;
        if snapshot.id != initiator {
            return walked;
        }
        if let Err(err) = walked {
            self.write(initiator, |controller| controller.teardown_queue.clear())?;
            return Err(err);
        }
        self.drain_teardown(initiator, flags)
    }

    async fn walk_deactivation(
        &self,
        snapshot: &Snapshot,
        initiator: ControllerId,
        flags: LifecycleFlags,
    ) -> LifecycleResult<()> {
        let flags = flags | snapshot.persistent_flags;
        let mut pending: Vec<LocalBoxFuture<'static, LifecycleResult<()>>> = Vec::new();

        for child in &snapshot.children {
            match self.deactivate(*child, initiator, Some(snapshot.id), flags) {
                Deferred::Immediate(result) => result?,
                Deferred::Pending(fut) => pending.push(fut),
            }
        }

        let detaching = match &snapshot.hooks.detaching {
            Some(hook) if snapshot.has(HookCapabilities::DETACHING) => {
                hook(&snapshot.context(self, initiator, flags))
            }
            _ => Deferred::done(),
        };

        // Queue position reflects call order, not settle order.
        self.write(initiator, |controller| controller.teardown_queue.push(snapshot.id))?;
        tracing::trace!(controller = %snapshot.id, initiator = %initiator, "queued for teardown");

        match detaching {
            Deferred::Immediate(result) => {
                result.map_err(|err| snapshot.hook_error(Hook::Detaching, err))?
            }
            Deferred::Pending(fut) => {
                let (id, name) = (snapshot.id, snapshot.name.clone());
                pending.push(
                    fut.map(move |result| {
                        result.map_err(|err| hook_error(id, &name, Hook::Detaching, err))
                    })
                    .boxed_local(),
                );
            }
        }

        future::try_join_all(pending).await?;
        Ok(())
    }

    /// The initiator's batched remove + unbind pass.
    ///
    /// A failing `unbinding` hook or bindable stops the rest of that
    /// controller's unbind sequence only. The pass still visits every queued
    /// controller, every one of them ends `DEACTIVATED`, and the first error is
    /// returned afterwards.
    fn drain_teardown(&self, initiator: ControllerId, flags: LifecycleFlags) -> LifecycleResult<()> {
        let queue = self.write(initiator, |controller| std::mem::take(&mut controller.teardown_queue))?;
        tracing::debug!(initiator = %initiator, queued = queue.len(), "teardown pass");

        let mut first_error = None;
        for id in &queue {
            let snapshot = self.read(*id, |controller| {
                (!controller.state.is_disposed()).then(|| Snapshot::of(controller))
            })?;
            // Disposed while its initiator was still detaching.
            let Some(snapshot) = snapshot else {
                tracing::trace!(controller = %id, "skipping disposed controller");
                continue;
            };
            if let Some(nodes) = &snapshot.nodes {
                tracing::trace!(controller = %id, "remove");
                nodes.remove();
                nodes.unlink();
            }
            if let Err(err) = snapshot.unbind(self, initiator, flags) {
                tracing::warn!(controller = %id, error = %err, "unbind failed during teardown");
                first_error.get_or_insert(err);
            }
        }

        for id in &queue {
            self.finish_deactivation(*id)?;
        }
        for id in queue {
            self.consume_release(id)?;
        }
        first_error.map_or(Ok(()), Err)
    }

    fn finish_deactivation(&self, id: ControllerId) -> LifecycleResult<()> {
        self.write(id, |controller| {
            if controller.state.is_disposed() {
                return;
            }
            controller.state = State::DEACTIVATED | controller.state.intersection(State::RELEASED);
            controller.parent = None;
            controller.supplied_scope = None;
            controller.host_scope = None;
            controller.persistent_flags = LifecycleFlags::NONE;

            match controller.kind {
                ControllerKind::ElementComponent => {
                    if let Some(scope) = &controller.scope {
                        scope.set_parent(None);
                    }
                }
                ControllerKind::AttributeComponent => controller.scope = None,
                ControllerKind::SyntheticView => {
                    if !controller.scope_locked {
                        controller.scope = None;
                    }
                }
            }

            tracing::debug!(controller = %controller.id, name = %controller.name, "deactivated");
        })
    }

    /// A released synthetic view goes back to its factory cache, or is disposed.
    fn consume_release(&self, id: ControllerId) -> LifecycleResult<()> {
        let released = self.write(id, |controller| {
            let state = controller.state;
            if controller.kind != ControllerKind::SyntheticView
                || !state.contains(State::RELEASED)
                || state.is_disposed()
            {
                return None;
            }
            controller.state.remove(State::RELEASED);
            Some(controller.factory.clone())
        })?;

        match released {
            None => Ok(()),
            Some(Some(factory)) if factory.try_return_to_cache(id) => {
                tracing::trace!(controller = %id, factory = factory.name(), "returned to view cache");
                Ok(())
            }
            Some(_) => self.dispose(id),
        }
    }
}
