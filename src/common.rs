// Copyright 2025 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::time::Instant;

/// The error type reported by [`Poolable::close`].
pub type CloseError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A resource that can live inside a [`Pool`](crate::Pool).
///
/// The single method, [`close`](Poolable::close), is the teardown capability:
/// the pool invokes it exactly once when it destroys the resource, that is,
/// when the resource is invalidated on release, when a release cleaner fails,
/// or when the pool shuts down. The default body does nothing, which is the
/// right choice for resources that hold no handle of their own.
///
/// Close failures never propagate; the pool logs them at WARN and drops the
/// resource regardless.
pub trait Poolable: Send + 'static {
    /// Releases whatever the resource holds onto.
    fn close(&mut self) -> Result<(), CloseError> {
        Ok(())
    }
}

/// A trait whose instance creates, cleans, and invalidates pooled resources.
///
/// This is the per-resource half of the pool configuration; the numeric half
/// lives in [`PoolConfig`](crate::PoolConfig).
pub trait ManageResource: Send + Sync + 'static {
    /// The type of resources that this instance manages.
    type Resource: Poolable;

    /// The type of errors that allocation and cleaning can report.
    type Error: Send + 'static;

    /// Starts one allocation.
    ///
    /// The implementation must complete `allocation` exactly once, with either
    /// a fresh resource or an error. Completion may happen synchronously on
    /// the calling thread or later on any other thread; the pool continues on
    /// whichever thread completes the token. See the crate-level documentation
    /// for how this drives the delivery-thread contract.
    fn allocate(&self, allocation: Allocation<Self::Resource, Self::Error>);

    /// Cleans a resource that a borrower has returned.
    ///
    /// Runs on the releasing thread. An error here surfaces to the releaser
    /// and causes the resource to be destroyed instead of recycled.
    fn clean(&self, resource: &mut Self::Resource) -> Result<(), Self::Error>;

    /// Whether a returned resource is no longer fit for reuse.
    ///
    /// Evaluated after [`clean`](ManageResource::clean) succeeds. Returning
    /// `true` destroys the resource and frees its slot.
    fn is_stale(&self, resource: &Self::Resource, status: &RefStatus) -> bool;
}

/// A single allocation requested from [`ManageResource::allocate`].
///
/// The token must be completed exactly once. Dropping it without completing
/// leaves the acquisition that triggered it waiting forever, so the drop is
/// logged at WARN.
pub struct Allocation<R, E> {
    outcome: Option<Box<dyn FnOnce(Result<R, E>) + Send + 'static>>,
}

impl<R, E> std::fmt::Debug for Allocation<R, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Allocation")
            .field("completed", &self.outcome.is_none())
            .finish()
    }
}

impl<R, E> Allocation<R, E> {
    pub(crate) fn new(outcome: impl FnOnce(Result<R, E>) + Send + 'static) -> Self {
        Self {
            outcome: Some(Box::new(outcome)),
        }
    }

    /// Completes the allocation with a fresh resource or an error.
    pub fn complete(mut self, result: Result<R, E>) {
        // SAFETY: `outcome` is always `Some` until `complete` consumes it.
        let outcome = self.outcome.take().unwrap();
        outcome(result);
    }
}

impl<R, E> Drop for Allocation<R, E> {
    fn drop(&mut self) {
        if self.outcome.is_some() {
            log::warn!("allocation token dropped without completing; a borrower may wait forever");
        }
    }
}

/// Book-keeping attached to one pooled resource.
///
/// See [`PooledRef::status`](crate::PooledRef::status).
#[derive(Debug, Clone, Copy)]
pub struct RefStatus {
    created: Instant,
    pub(crate) recycle_count: usize,
}

impl Default for RefStatus {
    fn default() -> Self {
        Self {
            created: Instant::now(),
            recycle_count: 0,
        }
    }
}

impl RefStatus {
    /// Returns the instant when the resource was allocated.
    pub fn created(&self) -> Instant {
        self.created
    }

    /// Returns how many times the resource went through a healthy release.
    pub fn recycle_count(&self) -> usize {
        self.recycle_count
    }
}
