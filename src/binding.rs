//! Bindable contract.
//!
//! Concrete bindings (property, listener, interpolation...) live outside the
//! engine. The engine only needs to tell them when to connect to a scope and
//! when to let go.

use std::rc::Rc;

use crate::error::CallbackError;
use crate::scope::Scope;
use crate::types::LifecycleFlags;

/// Something a controller binds on activation and unbinds on teardown.
///
/// A controller binds its bindables in the order they were added and unbinds
/// them in that same order.
pub trait Bindable {
    /// Connect to `scope`. `flags` always contains `FROM_BIND` plus the
    /// controller's persistent bits.
    fn bind(
        &self,
        flags: LifecycleFlags,
        scope: &Rc<Scope>,
        host_scope: Option<&Rc<Scope>>,
    ) -> Result<(), CallbackError>;

    /// Disconnect. `flags` always contains `FROM_UNBIND`.
    fn unbind(&self, flags: LifecycleFlags) -> Result<(), CallbackError>;
}
