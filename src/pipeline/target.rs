//! Mount targets - how a controller's nodes attach to the document.
//!
//! The engine never touches document nodes itself. It holds a
//! [`NodeSequence`] per controller and a [`MountTarget`] that says where the
//! sequence goes:
//!
//! ```text
//! Host        nodes.append_to(host)
//! ShadowRoot  styles.apply_to(root); nodes.append_to(root)
//! Location    nodes.insert_before(anchor)   (containerless composition)
//! None        nothing (attribute components)
//! ```

use std::fmt;
use std::rc::Rc;

// =============================================================================
// External Node Contracts
// =============================================================================

/// A document node owned by the host renderer.
pub trait HostNode {
    fn node_name(&self) -> &str;
}

/// Shared handle to a host node.
pub type NodeRef = Rc<dyn HostNode>;

/// The nodes a controller renders, produced at hydration time.
pub trait NodeSequence {
    fn append_to(&self, parent: &NodeRef);
    fn insert_before(&self, anchor: &NodeRef);
    /// Take the nodes out of the document.
    fn remove(&self);
    /// Drop sibling links to neighbouring sequences.
    fn unlink(&self);
    /// Nodes marked as binding targets.
    fn find_targets(&self) -> Vec<NodeRef>;
}

/// Applies a style sheet to a shadow root before content is appended.
pub trait StyleApplier {
    fn apply_to(&self, shadow_root: &NodeRef);
}

// =============================================================================
// Mount Target
// =============================================================================

#[derive(Clone, Default)]
pub enum MountTarget {
    /// Never mounts (attribute components).
    #[default]
    None,
    /// Append into the element's backing node.
    Host(NodeRef),
    /// Apply styles, then append into the shadow root.
    ShadowRoot {
        root: NodeRef,
        styles: Option<Rc<dyn StyleApplier>>,
    },
    /// Insert before a relocated anchor.
    Location(NodeRef),
}

impl MountTarget {
    pub fn label(&self) -> &'static str {
        match self {
            MountTarget::None => "none",
            MountTarget::Host(_) => "host",
            MountTarget::ShadowRoot { .. } => "shadow-root",
            MountTarget::Location(_) => "location",
        }
    }

    /// Put `nodes` into the document according to this target.
    pub(crate) fn mount(&self, nodes: &dyn NodeSequence) {
        match self {
            MountTarget::None => {}
            MountTarget::Host(host) => nodes.append_to(host),
            MountTarget::ShadowRoot { root, styles } => {
                if let Some(styles) = styles {
                    styles.apply_to(root);
                }
                nodes.append_to(root);
            }
            MountTarget::Location(anchor) => nodes.insert_before(anchor),
        }
    }
}

impl fmt::Debug for MountTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MountTarget::None => f.write_str("None"),
            MountTarget::Host(host) => write!(f, "Host({})", host.node_name()),
            MountTarget::ShadowRoot { root, styles } => f
                .debug_struct("ShadowRoot")
                .field("root", &root.node_name())
                .field("styled", &styles.is_some())
                .finish(),
            MountTarget::Location(anchor) => write!(f, "Location({})", anchor.node_name()),
        }
    }
}
