//! # spark-lifecycle
//!
//! Component lifecycle orchestration for declarative UI frameworks.
//!
//! Scope values are [spark-signals](https://github.com/RLabs-Inc/spark-signals)
//! signals, so bindings can observe them reactively.
//!
//! ## Architecture
//!
//! Component instances are controllers in an arena owned by a [`Lifecycle`].
//! A controller is addressed by its [`ControllerId`]; parents own children by
//! id and children refer back to their parent by id while active.
//!
//! Every tree moves through the same state machine:
//! ```text
//! NONE ─activate→ ACTIVATING ─settle→ ACTIVATED ─deactivate→ DEACTIVATING ─settle→ DEACTIVATED
//!                                                                                     │
//!                                                      activate again ←───────────────┘
//! any ─dispose→ DISPOSED
//! ```
//!
//! Activation runs parent first (bind, mount, attach) and deactivation runs
//! children first. Physical removal and unbinding are batched: the controller
//! that started a deactivation (the *initiator*) drains one queue for the whole
//! subtree once every `detaching` hook has settled.
//!
//! Hooks may complete later. The engine returns [`Deferred::Immediate`] when
//! nothing suspended and [`Deferred::Pending`] otherwise, so synchronous trees
//! never need an executor.
//!
//! ## Modules
//!
//! - [`types`] - Ids, controller kinds, state and flag bitsets
//! - [`engine`] - Controller arena, hooks, registry, view factories
//! - [`protocol`] - Activation, deactivation and disposal walks
//! - [`scope`] - Binding-context graph backed by signals
//! - [`pipeline`] - Mount targets, node contracts and the root mount handle

pub mod binding;
pub mod config;
pub mod deferred;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod protocol;
pub mod scope;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use binding::Bindable;
pub use config::{CacheSize, EngineConfig, InactiveParentPolicy};
pub use deferred::{Deferred, HookOutcome, Transition};
pub use error::{CallbackError, LifecycleError, LifecycleResult};

pub use engine::{
    AcceptHook, ControllerProps, DeferredHook, DisposeHook, Hook, HookCapabilities, HookContext,
    Lifecycle, LifecycleHooks, SyncHook, ViewFactory,
};

pub use pipeline::{HostNode, MountHandle, MountTarget, NodeRef, NodeSequence, StyleApplier};

pub use scope::{BindingContext, ContextKind, Scope, ScopeValue};
