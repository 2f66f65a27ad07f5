//! Error types.
//!
//! Host callbacks (hooks and bindables) fail with a [`CallbackError`]. The
//! engine wraps it into a [`LifecycleError`] that names the controller, so the
//! host always learns which node of the tree failed.

use thiserror::Error;

use crate::engine::Hook;
use crate::types::{ControllerId, ControllerKind, State};

/// Result alias used throughout the engine.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Failure raised by a host-provided hook or bindable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CallbackError {
    message: String,
}

impl CallbackError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for CallbackError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for CallbackError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Every failure the engine surfaces to its caller.
///
/// Nothing is retried and nothing is rolled back: a failed walk may leave part
/// of the tree in an intermediate state.
#[derive(Debug, Clone, Error)]
pub enum LifecycleError {
    /// Operation not permitted from the controller's current state.
    #[error("cannot {operation} {name} ({controller}) while in state {state:?}")]
    InvalidTransition {
        controller: ControllerId,
        name: String,
        operation: &'static str,
        state: State,
    },

    /// An attribute or synthetic view was activated without a scope.
    #[error("{name} ({controller}) requires a scope to activate")]
    MissingScope { controller: ControllerId, name: String },

    /// Activation under an inactive parent, reported only under
    /// [`InactiveParentPolicy::Reject`](crate::InactiveParentPolicy::Reject).
    #[error("{name} ({controller}) cannot activate: parent {parent} is not active")]
    InactiveParent {
        controller: ControllerId,
        name: String,
        parent: ControllerId,
    },

    /// A lifecycle hook threw or its deferred result rejected.
    #[error("{hook} hook of {name} ({controller}) failed: {source}")]
    Hook {
        controller: ControllerId,
        name: String,
        hook: Hook,
        #[source]
        source: CallbackError,
    },

    /// A bindable failed to bind or unbind.
    #[error("binding {position} of {name} ({controller}) failed to {operation}: {source}")]
    Binding {
        controller: ControllerId,
        name: String,
        position: usize,
        operation: &'static str,
        #[source]
        source: CallbackError,
    },

    /// The id does not belong to this engine.
    #[error("unknown controller {0}")]
    UnknownController(ControllerId),

    /// A view factory template produced something other than a synthetic view.
    #[error("view factory {factory} produced a {kind} instead of a synthetic view")]
    NotSynthetic { factory: String, kind: ControllerKind },
}

impl LifecycleError {
    /// The controller the failure is attributed to, if one exists yet.
    pub fn controller(&self) -> Option<ControllerId> {
        match self {
            LifecycleError::InvalidTransition { controller, .. }
            | LifecycleError::MissingScope { controller, .. }
            | LifecycleError::InactiveParent { controller, .. }
            | LifecycleError::Hook { controller, .. }
            | LifecycleError::Binding { controller, .. } => Some(*controller),
            LifecycleError::UnknownController(controller) => Some(*controller),
            LifecycleError::NotSynthetic { .. } => None,
        }
    }
}
