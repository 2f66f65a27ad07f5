//! Disposal and tree traversal.

use crate::engine::{HookCapabilities, Lifecycle};
use crate::error::LifecycleResult;
use crate::types::{ControllerId, State};

impl Lifecycle {
    /// Dispose `id` and everything it owns. Idempotent.
    ///
    /// Children go first, then the `dispose` hook runs, then the controller
    /// leaves its factory cache and the registry and keeps only its identity.
    /// Disposal does not deactivate; deactivate first if the nodes are mounted.
    pub fn dispose(&self, id: ControllerId) -> LifecycleResult<()> {
        let entry = self.write(id, |controller| {
            if controller.state.is_disposed() {
                return None;
            }
            controller.state.insert(State::DISPOSED);
            Some((
                controller.children.clone(),
                controller.capabilities,
                controller.hooks.dispose.clone(),
                controller.factory.clone(),
            ))
        })?;
        let Some((children, capabilities, hook, factory)) = entry else {
            return Ok(());
        };

        for child in children {
            self.dispose(child)?;
        }

        if capabilities.contains(HookCapabilities::DISPOSE) {
            if let Some(hook) = hook {
                hook();
            }
        }
        if let Some(factory) = factory {
            factory.evict(id);
        }

        self.retire(id)?;
        tracing::debug!(controller = %id, "disposed");
        Ok(())
    }

    /// Depth-first visit of `id`, whatever its view model exposes through its
    /// `accept` hook, then its children. Stops as soon as `visitor` returns true.
    pub fn accept(&self, id: ControllerId, visitor: &mut dyn FnMut(ControllerId) -> bool) -> bool {
        if visitor(id) {
            return true;
        }

        let Ok((hook, children)) = self.read(id, |controller| {
            let hook = controller
                .capabilities
                .contains(HookCapabilities::ACCEPT)
                .then(|| controller.hooks.accept.clone())
                .flatten();
            (hook, controller.children.clone())
        }) else {
            return false;
        };

        if let Some(hook) = hook {
            if hook(self, visitor) {
                return true;
            }
        }
        children.into_iter().any(|child| self.accept(child, visitor))
    }
}
