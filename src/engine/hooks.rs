//! Lifecycle hooks and the capability set probed from them.
//!
//! A view model takes part in the lifecycle through optional callbacks. Which
//! callbacks exist is recorded once, when the controller is hydrated, as a
//! [`HookCapabilities`] bitset. The protocols branch on that bitset and never
//! look at the callbacks again to decide whether a phase applies.
//!
//! ```ignore
//! let hooks = LifecycleHooks::default()
//!     .with_attaching(|ctx| {
//!         // start an enter animation, finish later
//!         Deferred::pending(animate_in(ctx.controller))
//!     })
//!     .with_detaching(|_| Deferred::done());
//! ```

use std::fmt;
use std::rc::Rc;

use crate::deferred::HookOutcome;
use crate::error::CallbackError;
use crate::scope::Scope;
use crate::types::{ControllerId, LifecycleFlags};

use super::Lifecycle;

// =============================================================================
// Hook Names
// =============================================================================

/// The lifecycle hooks a failure can be attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Binding,
    Bound,
    Attaching,
    Attached,
    Detaching,
    Unbinding,
}

impl Hook {
    pub fn label(self) -> &'static str {
        match self {
            Hook::Binding => "binding",
            Hook::Bound => "bound",
            Hook::Attaching => "attaching",
            Hook::Attached => "attached",
            Hook::Detaching => "detaching",
            Hook::Unbinding => "unbinding",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Hook Context
// =============================================================================

/// Everything a hook receives.
///
/// `lifecycle` is a handle to the engine that is driving the call. Hooks may
/// use it reentrantly, for example a template controller activating its views
/// from `attaching` or deactivating them from `detaching` with the same
/// `initiator` so their teardown joins the initiator's batch.
#[derive(Clone)]
pub struct HookContext {
    pub lifecycle: Lifecycle,
    pub controller: ControllerId,
    pub initiator: ControllerId,
    pub parent: Option<ControllerId>,
    pub flags: LifecycleFlags,
    /// The controller's own scope (its private scope for element components).
    pub scope: Option<Rc<Scope>>,
    pub host_scope: Option<Rc<Scope>>,
}

// =============================================================================
// Hook Types
// =============================================================================

/// A hook that may suspend the walk (`binding`, `bound`, `attaching`, `detaching`).
pub type DeferredHook = Rc<dyn Fn(&HookContext) -> HookOutcome>;

/// A hook that always completes synchronously (`attached`, `unbinding`).
pub type SyncHook = Rc<dyn Fn(&HookContext) -> Result<(), CallbackError>>;

/// Called once when the controller is disposed.
pub type DisposeHook = Rc<dyn Fn()>;

/// Lets a view model expose controllers it manages outside `children`, usually
/// by calling `lifecycle.accept(view, visitor)` for each of its views.
/// Return true to stop the traversal.
pub type AcceptHook = Rc<dyn Fn(&Lifecycle, &mut dyn FnMut(ControllerId) -> bool) -> bool>;

/// The optional callbacks of one view model.
#[derive(Clone, Default)]
pub struct LifecycleHooks {
    pub binding: Option<DeferredHook>,
    pub bound: Option<DeferredHook>,
    pub attaching: Option<DeferredHook>,
    pub attached: Option<SyncHook>,
    pub detaching: Option<DeferredHook>,
    pub unbinding: Option<SyncHook>,
    pub dispose: Option<DisposeHook>,
    pub accept: Option<AcceptHook>,
}

impl LifecycleHooks {
    pub fn with_binding(mut self, hook: impl Fn(&HookContext) -> HookOutcome + 'static) -> Self {
        self.binding = Some(Rc::new(hook));
        self
    }

    pub fn with_bound(mut self, hook: impl Fn(&HookContext) -> HookOutcome + 'static) -> Self {
        self.bound = Some(Rc::new(hook));
        self
    }

    pub fn with_attaching(mut self, hook: impl Fn(&HookContext) -> HookOutcome + 'static) -> Self {
        self.attaching = Some(Rc::new(hook));
        self
    }

    pub fn with_attached(
        mut self,
        hook: impl Fn(&HookContext) -> Result<(), CallbackError> + 'static,
    ) -> Self {
        self.attached = Some(Rc::new(hook));
        self
    }

    pub fn with_detaching(mut self, hook: impl Fn(&HookContext) -> HookOutcome + 'static) -> Self {
        self.detaching = Some(Rc::new(hook));
        self
    }

    pub fn with_unbinding(
        mut self,
        hook: impl Fn(&HookContext) -> Result<(), CallbackError> + 'static,
    ) -> Self {
        self.unbinding = Some(Rc::new(hook));
        self
    }

    pub fn with_dispose(mut self, hook: impl Fn() + 'static) -> Self {
        self.dispose = Some(Rc::new(hook));
        self
    }

    pub fn with_accept(
        mut self,
        hook: impl Fn(&Lifecycle, &mut dyn FnMut(ControllerId) -> bool) -> bool + 'static,
    ) -> Self {
        self.accept = Some(Rc::new(hook));
        self
    }
}

// =============================================================================
// Hook Capabilities (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Which hooks a view model implements, probed once at hydration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct HookCapabilities: u8 {
        const NONE = 0;
        const BINDING = 1 << 0;
        const BOUND = 1 << 1;
        const ATTACHING = 1 << 2;
        const ATTACHED = 1 << 3;
        const DETACHING = 1 << 4;
        const UNBINDING = 1 << 5;
        const DISPOSE = 1 << 6;
        const ACCEPT = 1 << 7;
    }
}

impl HookCapabilities {
    pub fn probe(hooks: &LifecycleHooks) -> HookCapabilities {
        let mut caps = HookCapabilities::NONE;
        caps.set(HookCapabilities::BINDING, hooks.binding.is_some());
        caps.set(HookCapabilities::BOUND, hooks.bound.is_some());
        caps.set(HookCapabilities::ATTACHING, hooks.attaching.is_some());
        caps.set(HookCapabilities::ATTACHED, hooks.attached.is_some());
        caps.set(HookCapabilities::DETACHING, hooks.detaching.is_some());
        caps.set(HookCapabilities::UNBINDING, hooks.unbinding.is_some());
        caps.set(HookCapabilities::DISPOSE, hooks.dispose.is_some());
        caps.set(HookCapabilities::ACCEPT, hooks.accept.is_some());
        caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deferred::Deferred;

    #[test]
    fn test_probe_empty() {
        let caps = HookCapabilities::probe(&LifecycleHooks::default());
        assert_eq!(caps, HookCapabilities::NONE);
    }

    #[test]
    fn test_probe_records_present_hooks() {
        let hooks = LifecycleHooks::default()
            .with_binding(|_| Deferred::done())
            .with_attached(|_| Ok(()))
            .with_dispose(|| {});

        let caps = HookCapabilities::probe(&hooks);
        assert_eq!(
            caps,
            HookCapabilities::BINDING | HookCapabilities::ATTACHED | HookCapabilities::DISPOSE
        );
        assert!(!caps.contains(HookCapabilities::DETACHING));
    }

    #[test]
    fn test_hook_labels() {
        assert_eq!(Hook::Detaching.to_string(), "detaching");
        assert_eq!(Hook::Bound.label(), "bound");
    }
}
