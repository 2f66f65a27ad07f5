//! Core types for spark-lifecycle.
//!
//! These types are shared by every module: controller identity, controller
//! kinds, the lifecycle state bitmask and the flag set threaded through every
//! bind/unbind call.

use std::fmt;

// =============================================================================
// Controller Identity
// =============================================================================

/// Opaque identity of a controller inside a [`Lifecycle`](crate::Lifecycle).
///
/// Ids are handed out sequentially and never reused. A stale id can only
/// refer to a disposed tombstone, never to an unrelated controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerId(pub(crate) usize);

impl ControllerId {
    /// Position of this controller in its arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Controller Kind
// =============================================================================

/// What a controller wraps. Determines scope semantics and naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerKind {
    /// A custom element with its own private, boundary scope.
    ElementComponent,
    /// A custom attribute (including template controllers). Adopts the
    /// supplied scope and never mounts nodes of its own.
    AttributeComponent,
    /// An anonymous view, usually produced by a view factory.
    #[default]
    SyntheticView,
}

impl ControllerKind {
    pub fn label(self) -> &'static str {
        match self {
            ControllerKind::ElementComponent => "element",
            ControllerKind::AttributeComponent => "attribute",
            ControllerKind::SyntheticView => "view",
        }
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Lifecycle State (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Lifecycle state of a controller.
    ///
    /// The phase bits are mutually exclusive. `RELEASED` is orthogonal and may
    /// be combined with any phase until it is consumed at unbind time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct State: u8 {
        const NONE = 0;
        const ACTIVATING = 1 << 0;
        const ACTIVATED = 1 << 1;
        const DEACTIVATING = 1 << 2;
        const DEACTIVATED = 1 << 3;
        const RELEASED = 1 << 4;
        const DISPOSED = 1 << 5;
    }
}

impl State {
    /// Active means activating or activated, and not on the way down.
    pub fn is_active(self) -> bool {
        self.intersects(State::ACTIVATING | State::ACTIVATED) && !self.contains(State::DEACTIVATING)
    }

    /// The phase without the orthogonal `RELEASED` bit.
    pub fn phase(self) -> State {
        self.difference(State::RELEASED)
    }

    pub fn is_disposed(self) -> bool {
        self.contains(State::DISPOSED)
    }
}

// =============================================================================
// Lifecycle Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Context bits threaded through every bind/unbind call.
    ///
    /// Combine with bitwise OR: `LifecycleFlags::FROM_BIND | LifecycleFlags::IS_STRICT_BINDING`.
    /// The bits in [`LifecycleFlags::PERSISTENT`] are retained on a controller when
    /// it activates and re-applied to every interior call until it deactivates.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct LifecycleFlags: u32 {
        const NONE = 0;
        /// The call originates from an activation pass.
        const FROM_BIND = 1 << 0;
        /// The call originates from a teardown pass.
        const FROM_UNBIND = 1 << 1;
        /// Bindings evaluate strictly (missing names are errors, not `Null`).
        const IS_STRICT_BINDING = 1 << 2;
        /// Scope lookups may continue past boundary scopes.
        const ALLOW_PARENT_SCOPE_TRAVERSAL = 1 << 3;

        const PERSISTENT = Self::IS_STRICT_BINDING.bits() | Self::ALLOW_PARENT_SCOPE_TRAVERSAL.bits();
    }
}

impl LifecycleFlags {
    /// The subset of bits a controller keeps for its active lifetime.
    pub fn persistent(self) -> LifecycleFlags {
        self.intersection(LifecycleFlags::PERSISTENT)
    }
}
