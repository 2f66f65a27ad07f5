//! Deferred results - a value that is either ready now or arrives later.
//!
//! Hooks return a [`Deferred`] instead of always returning a future, so the
//! common synchronous case never allocates or suspends. The engine itself
//! uses the same shape for its own transitions: it drives a protocol future
//! exactly once on the caller's stack and only hands back a pending future
//! when some hook actually suspended.

use std::future::Future;
use std::task::{Context, Poll};

use futures::future::{self, LocalBoxFuture};
use futures::task::noop_waker_ref;
use futures::FutureExt;

use crate::error::{CallbackError, LifecycleError};

/// Outcome of a hook that may complete asynchronously.
pub type HookOutcome = Deferred<Result<(), CallbackError>>;

/// Outcome of `activate()` / `deactivate()`.
pub type Transition = Deferred<Result<(), LifecycleError>>;

/// `Immediate(T)` or `Pending(future of T)`.
#[must_use = "a pending transition does nothing unless awaited"]
pub enum Deferred<T> {
    Immediate(T),
    Pending(LocalBoxFuture<'static, T>),
}

impl<T: 'static> Deferred<T> {
    /// Wrap a future as a pending result.
    pub fn pending(fut: impl Future<Output = T> + 'static) -> Self {
        Deferred::Pending(fut.boxed_local())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Deferred::Pending(_))
    }

    /// The value, if it is already available.
    pub fn now(self) -> Option<T> {
        match self {
            Deferred::Immediate(value) => Some(value),
            Deferred::Pending(_) => None,
        }
    }

    /// Wait for the value.
    pub async fn resolve(self) -> T {
        match self {
            Deferred::Immediate(value) => value,
            Deferred::Pending(fut) => fut.await,
        }
    }

    /// Convert to a boxed future so deferreds can be joined together.
    pub fn boxed(self) -> LocalBoxFuture<'static, T> {
        match self {
            Deferred::Immediate(value) => future::ready(value).boxed_local(),
            Deferred::Pending(fut) => fut,
        }
    }

    pub fn map<U: 'static>(self, f: impl FnOnce(T) -> U + 'static) -> Deferred<U> {
        match self {
            Deferred::Immediate(value) => Deferred::Immediate(f(value)),
            Deferred::Pending(fut) => Deferred::Pending(fut.map(f).boxed_local()),
        }
    }
}

impl<E: 'static> Deferred<Result<(), E>> {
    /// A hook or transition that completed without work to wait for.
    pub fn done() -> Self {
        Deferred::Immediate(Ok(()))
    }

    /// A hook or transition that failed synchronously.
    pub fn failed(err: impl Into<E>) -> Self {
        Deferred::Immediate(Err(err.into()))
    }
}

impl<T> From<T> for Deferred<T> {
    fn from(value: T) -> Self {
        Deferred::Immediate(value)
    }
}

/// Poll `fut` once on the current stack.
///
/// Returns `Immediate` when it completed without suspending, otherwise the
/// partly-run future. A well-behaved future re-registers its waker on every
/// poll, so the no-op waker used here is replaced by the real one as soon as
/// the caller awaits the pending half.
pub(crate) fn run_until_stalled<T: 'static>(mut fut: LocalBoxFuture<'static, T>) -> Deferred<T> {
    let mut cx = Context::from_waker(noop_waker_ref());
    match fut.as_mut().poll(&mut cx) {
        Poll::Ready(value) => Deferred::Immediate(value),
        Poll::Pending => Deferred::Pending(fut),
    }
}

impl<T> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Deferred::Immediate(_) => f.write_str("Deferred::Immediate(..)"),
            Deferred::Pending(_) => f.write_str("Deferred::Pending(..)"),
        }
    }
}
