//! Mount Pipeline
//!
//! Connects the controller tree to the host document.
//!
//! ```text
//! hydrate → MountTarget (where) → NodeSequence (what) → MountHandle (when)
//! ```
//!
//! - **target** - host node contracts and mount target resolution
//! - **mount** - the root handle the host application starts and stops

pub mod mount;
mod target;

pub use mount::MountHandle;
pub use target::{HostNode, MountTarget, NodeRef, NodeSequence, StyleApplier};
