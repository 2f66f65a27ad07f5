//! Mount API - drive a root controller for the host application.
//!
//! A root is its own initiator: its deactivation drains the teardown queue of
//! the whole tree in one pass.
//!
//! # Example
//!
//! ```ignore
//! use spark_lifecycle::pipeline::MountHandle;
//!
//! let app = lifecycle.hydrate(ControllerProps {
//!     nodes: Some(rendered),
//!     mount_target: MountTarget::Host(body),
//!     ..ControllerProps::element("my-app", view_model)
//! });
//!
//! let handle = MountHandle::new(&lifecycle, app);
//! block_on(handle.start(None).resolve())?;
//!
//! // later
//! block_on(handle.stop().resolve())?;
//! handle.unmount()?;
//! ```

use std::cell::Cell;
use std::rc::Rc;

use crate::deferred::Transition;
use crate::engine::Lifecycle;
use crate::error::LifecycleResult;
use crate::scope::Scope;
use crate::types::{ControllerId, LifecycleFlags};

// =============================================================================
// Mount Handle
// =============================================================================

/// Owns a root controller on behalf of the host.
///
/// Dropping the handle disposes the tree unless `unmount()` already did.
pub struct MountHandle {
    lifecycle: Lifecycle,
    root: ControllerId,
    flags: LifecycleFlags,
    disposed: Cell<bool>,
}

impl MountHandle {
    pub fn new(lifecycle: &Lifecycle, root: ControllerId) -> Self {
        Self {
            lifecycle: lifecycle.clone(),
            root,
            flags: LifecycleFlags::NONE,
            disposed: Cell::new(false),
        }
    }

    /// Flags passed to every `start()` and `stop()`.
    pub fn with_flags(mut self, flags: LifecycleFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn root(&self) -> ControllerId {
        self.root
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Activate the root against `scope`.
    pub fn start(&self, scope: Option<Rc<Scope>>) -> Transition {
        tracing::debug!(root = %self.root, "start");
        self.lifecycle
            .activate(self.root, self.root, None, self.flags, scope, None)
    }

    /// Deactivate the root and run the batched teardown.
    pub fn stop(&self) -> Transition {
        tracing::debug!(root = %self.root, "stop");
        self.lifecycle.deactivate(self.root, self.root, None, self.flags)
    }

    /// Check if the root is activating or activated.
    pub fn is_running(&self) -> bool {
        self.lifecycle.is_active(self.root)
    }

    /// Stop the root and dispose the tree.
    ///
    /// A teardown still waiting on a `detaching` hook is abandoned; await
    /// `stop()` first to let it finish.
    ///
    /// The tree is disposed even when stopping fails; the stop error is
    /// returned after disposal.
    pub fn unmount(self) -> LifecycleResult<()> {
        self.disposed.set(true);
        let stopped = self.stop().now().unwrap_or(Ok(()));
        if let Err(err) = &stopped {
            tracing::warn!(root = %self.root, error = %err, "stop failed during unmount");
        }
        self.lifecycle.dispose(self.root)?;
        stopped
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        if self.disposed.replace(true) {
            return;
        }
        if let Err(err) = self.lifecycle.dispose(self.root) {
            tracing::warn!(root = %self.root, error = %err, "dispose on drop failed");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
