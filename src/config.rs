//! Engine configuration.
//!
//! A [`Lifecycle`](crate::Lifecycle) owns one `EngineConfig` for its whole
//! lifetime. The config decides which persistent flags every activation
//! carries, how view factories cache by default, and what happens when a
//! controller is activated under an inactive parent.
//!
//! ```ignore
//! use spark_lifecycle::{EngineConfig, Lifecycle, CacheSize};
//!
//! let lifecycle = Lifecycle::with_config(
//!     EngineConfig::default()
//!         .with_strict_binding(true)
//!         .with_default_view_cache_size(CacheSize::Bounded(8)),
//! );
//! ```

use crate::types::LifecycleFlags;

// =============================================================================
// Cache Size
// =============================================================================

/// How many released views a view factory keeps for reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheSize {
    /// Never cache; released views are disposed.
    #[default]
    Disabled,
    /// Keep at most this many views.
    Bounded(usize),
    /// Keep every released view.
    Unbounded,
}

impl CacheSize {
    /// Whether one more view fits when `cached` views are already held.
    pub fn admits(self, cached: usize) -> bool {
        match self {
            CacheSize::Disabled => false,
            CacheSize::Bounded(limit) => cached < limit,
            CacheSize::Unbounded => true,
        }
    }

    pub fn is_caching(self) -> bool {
        !matches!(self, CacheSize::Disabled | CacheSize::Bounded(0))
    }
}

// =============================================================================
// Inactive Parent Policy
// =============================================================================

/// What `activate()` does when the given parent is not active.
///
/// `Ignore` keeps the historical behavior: the call returns without changing
/// any state. It hides both racing activations and genuine caller misuse, so
/// every skip is also logged at warn level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InactiveParentPolicy {
    #[default]
    Ignore,
    Reject,
}

// =============================================================================
// Engine Config
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// OR `IS_STRICT_BINDING` into every activation.
    pub strict_binding: bool,
    /// OR `ALLOW_PARENT_SCOPE_TRAVERSAL` into every activation.
    pub parent_scope_traversal: bool,
    /// Cache size given to factories created through `Lifecycle::view_factory`.
    pub default_view_cache_size: CacheSize,
    pub inactive_parent: InactiveParentPolicy,
}

impl EngineConfig {
    pub fn with_strict_binding(mut self, strict: bool) -> Self {
        self.strict_binding = strict;
        self
    }

    pub fn with_parent_scope_traversal(mut self, allow: bool) -> Self {
        self.parent_scope_traversal = allow;
        self
    }

    pub fn with_default_view_cache_size(mut self, size: CacheSize) -> Self {
        self.default_view_cache_size = size;
        self
    }

    pub fn with_inactive_parent(mut self, policy: InactiveParentPolicy) -> Self {
        self.inactive_parent = policy;
        self
    }

    /// Flags every activation starts from, before the caller's own bits.
    pub fn activation_flags(&self) -> LifecycleFlags {
        let mut flags = LifecycleFlags::NONE;
        if self.strict_binding {
            flags |= LifecycleFlags::IS_STRICT_BINDING;
        }
        if self.parent_scope_traversal {
            flags |= LifecycleFlags::ALLOW_PARENT_SCOPE_TRAVERSAL;
        }
        flags
    }
}
