//! Recording test doubles shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use spark_lifecycle::{
    Bindable, CallbackError, ControllerId, ControllerProps, Deferred, HostNode, Lifecycle,
    LifecycleFlags, LifecycleHooks, MountTarget, NodeRef, NodeSequence, Scope, StyleApplier,
};

// =============================================================================
// Event Log
// =============================================================================

/// Shared, ordered record of everything the doubles observed.
#[derive(Clone, Default)]
pub struct Log(Rc<RefCell<Vec<String>>>);

impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|e| *e == entry).count()
    }

    /// Index of the first `entry`, panicking with the full log if absent.
    pub fn position(&self, entry: &str) -> usize {
        let entries = self.0.borrow();
        entries
            .iter()
            .position(|e| e == entry)
            .unwrap_or_else(|| panic!("{entry:?} not in {entries:?}"))
    }

    /// Entries ending in `suffix`, in order.
    pub fn with_suffix(&self, suffix: &str) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter(|e| e.ends_with(suffix))
            .cloned()
            .collect()
    }

    pub fn before(&self, first: &str, second: &str) -> bool {
        self.position(first) < self.position(second)
    }
}

// =============================================================================
// Host Nodes
// =============================================================================

pub struct Node(pub String);

impl HostNode for Node {
    fn node_name(&self) -> &str {
        &self.0
    }
}

pub fn node(name: &str) -> NodeRef {
    Rc::new(Node(name.to_owned()))
}

/// A node sequence that logs `name.append_to(target)`, `name.remove`, ...
pub struct RecordingNodes {
    name: String,
    log: Log,
    targets: Vec<NodeRef>,
}

impl RecordingNodes {
    pub fn new(name: &str, log: &Log) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_owned(),
            log: log.clone(),
            targets: Vec::new(),
        })
    }

    pub fn with_targets(name: &str, log: &Log, targets: Vec<NodeRef>) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_owned(),
            log: log.clone(),
            targets,
        })
    }
}

impl NodeSequence for RecordingNodes {
    fn append_to(&self, parent: &NodeRef) {
        self.log
            .push(format!("{}.append_to({})", self.name, parent.node_name()));
    }

    fn insert_before(&self, anchor: &NodeRef) {
        self.log
            .push(format!("{}.insert_before({})", self.name, anchor.node_name()));
    }

    fn remove(&self) {
        self.log.push(format!("{}.remove", self.name));
    }

    fn unlink(&self) {
        self.log.push(format!("{}.unlink", self.name));
    }

    fn find_targets(&self) -> Vec<NodeRef> {
        self.targets.clone()
    }
}

pub struct RecordingStyles(pub Log);

impl StyleApplier for RecordingStyles {
    fn apply_to(&self, shadow_root: &NodeRef) {
        self.0.push(format!("styles.apply_to({})", shadow_root.node_name()));
    }
}

// =============================================================================
// Bindings
// =============================================================================

/// A bindable that logs `name.bind` / `name.unbind` and keeps the flags it saw.
pub struct RecordingBinding {
    name: String,
    log: Log,
    fail_bind: bool,
    fail_unbind: bool,
    pub bind_flags: RefCell<Vec<LifecycleFlags>>,
    pub unbind_flags: RefCell<Vec<LifecycleFlags>>,
    pub scopes: RefCell<Vec<Rc<Scope>>>,
}

impl RecordingBinding {
    pub fn new(name: &str, log: &Log) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_owned(),
            log: log.clone(),
            fail_bind: false,
            fail_unbind: false,
            bind_flags: RefCell::default(),
            unbind_flags: RefCell::default(),
            scopes: RefCell::default(),
        })
    }

    pub fn failing(name: &str, log: &Log) -> Rc<Self> {
        Rc::new(Self {
            fail_bind: true,
            ..Rc::into_inner(Self::new(name, log)).expect("fresh binding")
        })
    }

    pub fn failing_unbind(name: &str, log: &Log) -> Rc<Self> {
        Rc::new(Self {
            fail_unbind: true,
            ..Rc::into_inner(Self::new(name, log)).expect("fresh binding")
        })
    }
}

impl Bindable for RecordingBinding {
    fn bind(
        &self,
        flags: LifecycleFlags,
        scope: &Rc<Scope>,
        _host_scope: Option<&Rc<Scope>>,
    ) -> Result<(), CallbackError> {
        self.log.push(format!("{}.bind", self.name));
        self.bind_flags.borrow_mut().push(flags);
        self.scopes.borrow_mut().push(Rc::clone(scope));
        if self.fail_bind {
            return Err(CallbackError::new(format!("{} refused to bind", self.name)));
        }
        Ok(())
    }

    fn unbind(&self, flags: LifecycleFlags) -> Result<(), CallbackError> {
        self.log.push(format!("{}.unbind", self.name));
        self.unbind_flags.borrow_mut().push(flags);
        if self.fail_unbind {
            return Err(CallbackError::new(format!("{} refused to unbind", self.name)));
        }
        Ok(())
    }
}

// =============================================================================
// Hooks
// =============================================================================

/// Every hook, logging `name.hook` and completing synchronously.
pub fn recording_hooks(name: &str, log: &Log) -> LifecycleHooks {
    let entry = |hook: &str| format!("{name}.{hook}");
    let (l1, e1) = (log.clone(), entry("binding"));
    let (l2, e2) = (log.clone(), entry("bound"));
    let (l3, e3) = (log.clone(), entry("attaching"));
    let (l4, e4) = (log.clone(), entry("attached"));
    let (l5, e5) = (log.clone(), entry("detaching"));
    let (l6, e6) = (log.clone(), entry("unbinding"));
    let (l7, e7) = (log.clone(), entry("dispose"));

    LifecycleHooks::default()
        .with_binding(move |_| {
            l1.push(e1.clone());
            Deferred::done()
        })
        .with_bound(move |_| {
            l2.push(e2.clone());
            Deferred::done()
        })
        .with_attaching(move |_| {
            l3.push(e3.clone());
            Deferred::done()
        })
        .with_attached(move |_| {
            l4.push(e4.clone());
            Ok(())
        })
        .with_detaching(move |_| {
            l5.push(e5.clone());
            Deferred::done()
        })
        .with_unbinding(move |_| {
            l6.push(e6.clone());
            Ok(())
        })
        .with_dispose(move || l7.push(e7.clone()))
}

// =============================================================================
// Tree Builders
// =============================================================================

/// An element component mounted into a host node, with recording hooks and nodes.
pub fn element(lifecycle: &Lifecycle, name: &str, log: &Log) -> ControllerId {
    lifecycle.hydrate(ControllerProps {
        hooks: recording_hooks(name, log),
        nodes: Some(RecordingNodes::new(name, log)),
        mount_target: MountTarget::Host(node(&format!("{name}-host"))),
        ..ControllerProps::element(name, Rc::new(name.to_owned()))
    })
}

/// A synthetic view inserted before an anchor, with recording hooks and nodes.
pub fn view(lifecycle: &Lifecycle, name: &str, log: &Log) -> ControllerId {
    lifecycle.hydrate(ControllerProps {
        hooks: recording_hooks(name, log),
        nodes: Some(RecordingNodes::new(name, log)),
        mount_target: MountTarget::Location(node(&format!("{name}-anchor"))),
        ..ControllerProps::synthetic(name)
    })
}

pub fn root_scope() -> Rc<Scope> {
    Scope::new(Default::default())
}

/// Activate `id` as a root and require a synchronous success.
pub fn activate_root(lifecycle: &Lifecycle, id: ControllerId) {
    lifecycle
        .activate(id, id, None, LifecycleFlags::NONE, Some(root_scope()), None)
        .now()
        .expect("activation completed synchronously")
        .expect("activation succeeded");
}

/// Deactivate `id` as its own initiator and require a synchronous success.
pub fn deactivate_root(lifecycle: &Lifecycle, id: ControllerId) {
    lifecycle
        .deactivate(id, id, None, LifecycleFlags::NONE)
        .now()
        .expect("deactivation completed synchronously")
        .expect("deactivation succeeded");
}
