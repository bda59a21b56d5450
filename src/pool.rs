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

use std::future::Future;
use std::future::IntoFuture;
use std::ops::Deref;
use std::ops::DerefMut;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::Weak;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::task::Context;
use std::task::Poll;
use std::task::Waker;

use crossbeam_queue::SegQueue;

use crate::common::Allocation;
use crate::common::ManageResource;
use crate::common::Poolable;
use crate::common::RefStatus;
use crate::error::PoolError;
use crate::mutex::Mutex;
use crate::scheduler::Scheduler;

/// The configuration of [`Pool`].
#[derive(Clone)]
#[non_exhaustive]
pub struct PoolConfig {
    /// Number of resources allocated synchronously at construction.
    pub min_size: usize,

    /// Hard upper bound on concurrently live resources.
    pub max_size: usize,

    /// Execution context on which borrowers are completed.
    ///
    /// When unset, a borrower is completed on the thread that paired it with
    /// a resource; see the crate-level documentation for which thread that is.
    pub delivery: Option<Arc<dyn Scheduler>>,
}

impl std::fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolConfig")
            .field("min_size", &self.min_size)
            .field("max_size", &self.max_size)
            .field("delivery", &self.delivery.as_ref().map(|_| "<scheduler>"))
            .finish()
    }
}

impl PoolConfig {
    /// Creates a new [`PoolConfig`].
    ///
    /// # Panics
    ///
    /// Panics unless `max_size >= max(1, min_size)`.
    pub fn new(min_size: usize, max_size: usize) -> Self {
        assert!(
            max_size >= min_size.max(1),
            "invalid configuration: max_size >= max(1, min_size) (actual: {max_size} >= max(1, {min_size}))",
        );

        Self {
            min_size,
            max_size,
            delivery: None,
        }
    }

    /// Returns a new [`PoolConfig`] that completes borrowers on `scheduler`.
    pub fn with_delivery_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.delivery = Some(scheduler);
        self
    }
}

/// The current pool status.
///
/// See [`Pool::status`].
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct PoolStatus {
    /// The maximum size of the pool.
    pub max_size: usize,

    /// The number of live resources, whether idle or on loan.
    pub live: usize,

    /// The number of idle resources waiting in the pool.
    pub idle_count: usize,

    /// The number of borrowers waiting for a resource.
    pub pending_count: usize,
}

/// A passive object pool delivering resources to asynchronous borrowers.
///
/// See the [crate-level documentation](crate) for the full model. In short:
/// [`Pool::borrow`] hands back a deferred [`Borrow`]; subscribing (or
/// awaiting) it queues the borrower and runs the drain loop, which pairs idle
/// resources with waiting borrowers and starts allocations while capacity
/// remains. [`PooledRef::release`] returns a resource, and [`Pool::dispose`]
/// shuts the pool down.
///
/// The pool owns no threads; all of its work runs on the threads of its
/// callers, of the allocator's completion, or of the configured delivery
/// scheduler.
pub struct Pool<M: ManageResource> {
    config: PoolConfig,
    manager: M,

    /// Resources currently owned by the pool, idle or on loan.
    live: AtomicUsize,
    /// Allocations started but not yet completed.
    allocating: AtomicUsize,
    /// Borrowers queued in `pending`, including not-yet-collected cancels.
    pending_count: AtomicUsize,
    /// Serialisation counter for the drain loop.
    wip: AtomicUsize,
    disposed: AtomicBool,

    available: SegQueue<Slot<M::Resource>>,
    pending: SegQueue<Arc<Waiter<M>>>,
}

impl<M> std::fmt::Debug for Pool<M>
where
    M: ManageResource,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("config", &self.config)
            .field("live", &self.live)
            .field("pending_count", &self.pending_count)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct Slot<R> {
    resource: R,
    status: RefStatus,
}

impl<R> Slot<R> {
    fn new(resource: R) -> Self {
        Self {
            resource,
            status: RefStatus::default(),
        }
    }
}

fn close_discarded<R: Poolable>(resource: &mut R) {
    if let Err(err) = resource.close() {
        log::warn!(
            "Failure while discarding a released Poolable that is Closeable, could not close: {err}"
        );
    }
}

impl<M: ManageResource> Pool<M> {
    /// Creates a new [`Pool`] and pre-warms it with `min_size` resources.
    ///
    /// Each pre-warm allocation is awaited to completion before the next one
    /// starts. If any of them fails, the resources allocated so far are
    /// destroyed and the allocator's error is returned; no partial pool is
    /// ever exposed.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid (`max_size < max(1, min_size)`)
    /// or if the allocator drops its [`Allocation`] token without completing.
    pub fn new(config: PoolConfig, manager: M) -> Result<Arc<Self>, M::Error> {
        assert!(
            config.max_size >= config.min_size.max(1),
            "invalid configuration: max_size >= max(1, min_size) (actual: {} >= max(1, {}))",
            config.max_size,
            config.min_size,
        );

        let pool = Arc::new(Self {
            config,
            manager,
            live: AtomicUsize::new(0),
            allocating: AtomicUsize::new(0),
            pending_count: AtomicUsize::new(0),
            wip: AtomicUsize::new(0),
            disposed: AtomicBool::new(false),
            available: SegQueue::new(),
            pending: SegQueue::new(),
        });

        for _ in 0..pool.config.min_size {
            let (tx, rx) = mpsc::channel();
            pool.manager.allocate(Allocation::new(move |result| {
                let _ = tx.send(result);
            }));
            let result = rx
                .recv()
                .unwrap_or_else(|_| panic!("allocator dropped the allocation token during pre-warm"));
            match result {
                Ok(resource) => {
                    pool.live.fetch_add(1, Ordering::AcqRel);
                    pool.available.push(Slot::new(resource));
                }
                Err(err) => {
                    while let Some(slot) = pool.available.pop() {
                        pool.destroy(slot);
                    }
                    return Err(err);
                }
            }
        }

        Ok(pool)
    }

    /// Returns a deferred acquisition.
    ///
    /// Nothing happens until the returned [`Borrow`] is subscribed or
    /// awaited; in particular a borrow on a disposed pool only fails at that
    /// point. The acquisition completes exactly once with a [`PooledRef`], an
    /// error, or not at all if it was cancelled first.
    pub fn borrow(self: &Arc<Self>) -> Borrow<M> {
        Borrow {
            pool: Arc::clone(self),
        }
    }

    /// Borrows a resource for the duration of one user computation.
    ///
    /// The resource is acquired, lent to `user`, and released exactly once
    /// when the computation finishes, whether it completes, returns early, or
    /// is cancelled by dropping the future. Cleaner failures on that final
    /// release surface as [`PoolError::Cleaner`].
    ///
    /// ```
    /// # use drainpool::{Allocation, ManageResource, Pool, PoolConfig, Poolable, RefStatus};
    /// # struct Conn { queries: usize }
    /// # impl Poolable for Conn {}
    /// # struct Manager;
    /// # impl ManageResource for Manager {
    /// #     type Resource = Conn;
    /// #     type Error = std::convert::Infallible;
    /// #     fn allocate(&self, allocation: Allocation<Conn, Self::Error>) {
    /// #         allocation.complete(Ok(Conn { queries: 0 }));
    /// #     }
    /// #     fn clean(&self, conn: &mut Conn) -> Result<(), Self::Error> {
    /// #         conn.queries = 0;
    /// #         Ok(())
    /// #     }
    /// #     fn is_stale(&self, _: &Conn, _: &RefStatus) -> bool {
    /// #         false
    /// #     }
    /// # }
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let pool = Pool::new(PoolConfig::new(0, 1), Manager).unwrap();
    /// let rows = pool
    ///     .borrow_in_scope(async |conn: &mut Conn| {
    ///         conn.queries += 1;
    ///         conn.queries * 10
    ///     })
    ///     .await
    ///     .unwrap();
    /// assert_eq!(rows, 10);
    /// assert_eq!(pool.status().idle_count, 1);
    /// # }
    /// ```
    pub async fn borrow_in_scope<T, F>(self: &Arc<Self>, user: F) -> Result<T, PoolError<M::Error>>
    where
        F: AsyncFnOnce(&mut M::Resource) -> T,
    {
        let mut pooled = self.borrow().await?;
        let value = user(&mut *pooled).await;
        pooled.release()?;
        Ok(value)
    }

    /// Shuts the pool down.
    ///
    /// Idempotent. Idle resources are destroyed, waiting borrowers are failed
    /// with [`PoolError::Shutdown`], and subsequent borrows fail the same
    /// way. Resources currently on loan are left alone; their release will
    /// destroy them.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        while let Some(slot) = self.available.pop() {
            self.destroy(slot);
        }
        self.fail_pending();
    }

    /// Whether [`Pool::dispose`] has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Returns the current status of the pool.
    ///
    /// The snapshot is not taken atomically; under load the numbers are an
    /// eventually consistent overall insight, not an exact accounting.
    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            max_size: self.config.max_size,
            live: self.live.load(Ordering::Acquire),
            idle_count: self.available.len(),
            pending_count: self.pending_count.load(Ordering::Acquire),
        }
    }

    fn subscribe(self: &Arc<Self>, on_complete: DeliveryFn<M>) -> BorrowHandle<M> {
        let waiter = Arc::new(Waiter::new(on_complete));
        let handle = BorrowHandle {
            waiter: Arc::clone(&waiter),
        };

        if self.is_disposed() {
            if waiter.claim() {
                self.complete(&waiter, Err(PoolError::Shutdown));
            }
            return handle;
        }

        self.pending.push(waiter);
        self.pending_count.fetch_add(1, Ordering::AcqRel);

        if self.is_disposed() {
            // lost the race against dispose(); its sweep may have missed us
            self.fail_pending();
        } else {
            self.drain();
        }

        handle
    }

    /// Hands the drain loop to the current thread unless another thread is
    /// already running it, in which case that thread picks up the extra work.
    fn drain(self: &Arc<Self>) {
        if self.wip.fetch_add(1, Ordering::AcqRel) == 0 {
            self.drain_loop();
        }
    }

    fn drain_loop(self: &Arc<Self>) {
        let mut missed = 1;
        loop {
            self.drain_pass();
            let wip = self.wip.fetch_sub(missed, Ordering::AcqRel) - missed;
            if wip == 0 {
                return;
            }
            missed = wip;
        }
    }

    /// One serialised pass: pair idle resources with waiting borrowers and
    /// start allocations while some waiter is uncovered and capacity remains.
    fn drain_pass(self: &Arc<Self>) {
        loop {
            if self.is_disposed() {
                return;
            }
            if self.pending_count.load(Ordering::Acquire) == 0 {
                return;
            }

            if let Some(slot) = self.available.pop() {
                let Some(waiter) = self.pending.pop() else {
                    // dispose() or an allocation failure raced us for the
                    // waiters; put the resource back
                    self.push_available(slot);
                    return;
                };
                self.pending_count.fetch_sub(1, Ordering::AcqRel);
                self.deliver(slot, waiter);
            } else {
                let covered = self.allocating.load(Ordering::Acquire);
                if covered >= self.pending_count.load(Ordering::Acquire) {
                    return;
                }
                if !self.try_reserve_capacity() {
                    return;
                }
                self.start_allocation();
            }
        }
    }

    /// Raises `live` by one unless the pool is at `max_size`.
    fn try_reserve_capacity(&self) -> bool {
        let mut live = self.live.load(Ordering::Acquire);
        loop {
            if live >= self.config.max_size {
                return false;
            }
            match self
                .live
                .compare_exchange(live, live + 1, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return true,
                Err(current) => live = current,
            }
        }
    }

    fn start_allocation(self: &Arc<Self>) {
        self.allocating.fetch_add(1, Ordering::AcqRel);
        let pool = Arc::downgrade(self);
        self.manager.allocate(Allocation::new(move |result| {
            let Some(pool) = pool.upgrade() else {
                if let Ok(mut resource) = result {
                    close_discarded(&mut resource);
                }
                return;
            };
            pool.allocating.fetch_sub(1, Ordering::AcqRel);
            match result {
                Ok(resource) => {
                    if pool.is_disposed() {
                        pool.destroy(Slot::new(resource));
                    } else {
                        pool.push_available(Slot::new(resource));
                        pool.drain();
                    }
                }
                Err(err) => {
                    pool.live.fetch_sub(1, Ordering::AcqRel);
                    if let Some(waiter) = pool.pop_claimed_waiter() {
                        pool.complete(&waiter, Err(PoolError::Allocator(err)));
                    }
                    pool.drain();
                }
            }
        }));
    }

    fn deliver(self: &Arc<Self>, slot: Slot<M::Resource>, waiter: Arc<Waiter<M>>) {
        if waiter.claim() {
            let pooled = PooledRef {
                slot: Some(slot),
                pool: Arc::downgrade(self),
            };
            self.complete(&waiter, Ok(pooled));
        } else {
            // the borrower cancelled inside the delivery window; the resource
            // goes back through the release path so the next waiter can have it
            let _ = self.release_slot(slot);
        }
    }

    /// Runs a claimed waiter's callback, on the delivery scheduler if one is
    /// configured and inline otherwise.
    fn complete(&self, waiter: &Waiter<M>, result: Result<PooledRef<M>, PoolError<M::Error>>) {
        let Some(on_complete) = waiter.on_complete.lock().take() else {
            return;
        };
        match &self.config.delivery {
            Some(scheduler) => scheduler.schedule(Box::new(move || on_complete(result))),
            None => on_complete(result),
        }
    }

    /// Pops waiters until one is successfully claimed, discarding cancelled
    /// entries along the way.
    fn pop_claimed_waiter(&self) -> Option<Arc<Waiter<M>>> {
        while let Some(waiter) = self.pending.pop() {
            self.pending_count.fetch_sub(1, Ordering::AcqRel);
            if waiter.claim() {
                return Some(waiter);
            }
        }
        None
    }

    fn fail_pending(&self) {
        while let Some(waiter) = self.pop_claimed_waiter() {
            self.complete(&waiter, Err(PoolError::Shutdown));
        }
    }

    fn release_slot(self: &Arc<Self>, mut slot: Slot<M::Resource>) -> Result<(), PoolError<M::Error>> {
        if self.is_disposed() {
            self.destroy(slot);
            return Ok(());
        }

        match self.manager.clean(&mut slot.resource) {
            Err(err) => {
                self.destroy(slot);
                self.drain();
                Err(PoolError::Cleaner(err))
            }
            Ok(()) => {
                if self.manager.is_stale(&slot.resource, &slot.status) {
                    self.destroy(slot);
                } else {
                    slot.status.recycle_count += 1;
                    self.push_available(slot);
                }
                self.drain();
                Ok(())
            }
        }
    }

    fn push_available(&self, slot: Slot<M::Resource>) {
        let live = self.live.load(Ordering::Acquire);
        assert!(
            live <= self.config.max_size,
            "invariant broken: live <= max_size (actual: {live} <= {})",
            self.config.max_size,
        );

        self.available.push(slot);
        if self.is_disposed() {
            // dispose() may have finished its sweep before our push landed
            while let Some(slot) = self.available.pop() {
                self.destroy(slot);
            }
        }
    }

    fn destroy(&self, slot: Slot<M::Resource>) {
        self.live.fetch_sub(1, Ordering::AcqRel);
        let mut resource = slot.resource;
        close_discarded(&mut resource);
    }
}

type DeliveryFn<M> = Box<
    dyn FnOnce(Result<PooledRef<M>, PoolError<<M as ManageResource>::Error>>) + Send + 'static,
>;

const WAITING: u8 = 0;
const CANCELLED: u8 = 1;
const COMPLETED: u8 = 2;

/// One queued acquisition: the borrower's completion callback plus the state
/// machine that makes completion and cancellation mutually exclusive.
struct Waiter<M: ManageResource> {
    state: AtomicU8,
    on_complete: Mutex<Option<DeliveryFn<M>>>,
}

impl<M: ManageResource> Waiter<M> {
    fn new(on_complete: DeliveryFn<M>) -> Self {
        Self {
            state: AtomicU8::new(WAITING),
            on_complete: Mutex::new(Some(on_complete)),
        }
    }

    /// Claims the exclusive right to complete this waiter. At most one claim
    /// ever succeeds, and a cancelled waiter can no longer be claimed.
    fn claim(&self) -> bool {
        self.state
            .compare_exchange(WAITING, COMPLETED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn cancel(&self) {
        if self
            .state
            .compare_exchange(WAITING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            // the callback will never run; let its captures go now
            self.on_complete.lock().take();
        }
    }
}

/// A deferred acquisition returned by [`Pool::borrow`].
///
/// The acquisition starts when the handle is [subscribed](Borrow::subscribe)
/// or awaited (via [`IntoFuture`]), and completes exactly once.
pub struct Borrow<M: ManageResource> {
    pool: Arc<Pool<M>>,
}

impl<M: ManageResource> std::fmt::Debug for Borrow<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Borrow").finish_non_exhaustive()
    }
}

impl<M: ManageResource> Borrow<M> {
    /// Starts the acquisition, completing `on_complete` exactly once.
    ///
    /// Unless the pool is configured with a delivery scheduler, the callback
    /// runs on the thread that pairs this borrower with a resource: the
    /// current thread when an idle resource is ready, the allocator's
    /// completion thread when one had to be created, or the releasing thread
    /// when the borrower had to wait for a return.
    pub fn subscribe<F>(self, on_complete: F) -> BorrowHandle<M>
    where
        F: FnOnce(Result<PooledRef<M>, PoolError<M::Error>>) + Send + 'static,
    {
        self.pool.subscribe(Box::new(on_complete))
    }
}

/// A handle onto a started acquisition, used to cancel it.
pub struct BorrowHandle<M: ManageResource> {
    waiter: Arc<Waiter<M>>,
}

impl<M: ManageResource> std::fmt::Debug for BorrowHandle<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BorrowHandle").finish_non_exhaustive()
    }
}

impl<M: ManageResource> BorrowHandle<M> {
    /// Cancels the acquisition if it has not completed yet.
    ///
    /// After a successful cancel the completion callback never runs. If a
    /// resource had already been routed to this borrower but not yet handed
    /// over, the pool releases it back; if the acquisition already completed,
    /// cancelling is a no-op.
    pub fn cancel(&self) {
        self.waiter.cancel();
    }
}

impl<M: ManageResource> IntoFuture for Borrow<M> {
    type Output = Result<PooledRef<M>, PoolError<M::Error>>;
    type IntoFuture = BorrowFuture<M>;

    fn into_future(self) -> BorrowFuture<M> {
        let shared = Arc::new(Mutex::new(Handoff {
            result: None,
            waker: None,
        }));
        let target = Arc::clone(&shared);
        let handle = self.subscribe(move |result| {
            let mut handoff = target.lock();
            handoff.result = Some(result);
            let waker = handoff.waker.take();
            drop(handoff);
            if let Some(waker) = waker {
                waker.wake();
            }
        });
        BorrowFuture { shared, handle }
    }
}

struct Handoff<M: ManageResource> {
    result: Option<Result<PooledRef<M>, PoolError<<M as ManageResource>::Error>>>,
    waker: Option<Waker>,
}

/// The future form of a [`Borrow`].
///
/// Dropping the future before completion cancels the acquisition; a resource
/// that won the race against the cancel is returned to the pool.
pub struct BorrowFuture<M: ManageResource> {
    shared: Arc<Mutex<Handoff<M>>>,
    handle: BorrowHandle<M>,
}

impl<M: ManageResource> std::fmt::Debug for BorrowFuture<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BorrowFuture").finish_non_exhaustive()
    }
}

impl<M: ManageResource> Future for BorrowFuture<M> {
    type Output = Result<PooledRef<M>, PoolError<M::Error>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut handoff = self.shared.lock();
        match handoff.result.take() {
            Some(result) => Poll::Ready(result),
            None => {
                handoff.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl<M: ManageResource> Drop for BorrowFuture<M> {
    fn drop(&mut self) {
        self.handle.cancel();
        // a delivery that beat the cancel left its ref here; dropping the ref
        // runs the release path and hands the resource back
        let raced = self.shared.lock().result.take();
        drop(raced);
    }
}

/// The custody token for one borrowed resource.
///
/// The ref owns its resource for the duration of the loan and implements
/// [`Deref`]/[`DerefMut`] to it. Returning the resource is explicit through
/// [`release`](PooledRef::release), which reports cleaner failures; dropping
/// an unreleased ref runs the same path and logs instead.
pub struct PooledRef<M: ManageResource> {
    slot: Option<Slot<M::Resource>>,
    pool: Weak<Pool<M>>,
}

impl<M> std::fmt::Debug for PooledRef<M>
where
    M: ManageResource,
    M::Resource: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledRef")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

impl<M: ManageResource> PooledRef<M> {
    /// Returns the borrowed resource.
    pub fn poolable(&self) -> &M::Resource {
        // SAFETY: `slot` is always `Some` while the ref is held.
        &self.slot.as_ref().unwrap().resource
    }

    /// Returns the status of the borrowed resource.
    pub fn status(&self) -> RefStatus {
        // SAFETY: `slot` is always `Some` while the ref is held.
        self.slot.as_ref().unwrap().status
    }

    /// Returns the resource to the pool.
    ///
    /// Runs on the calling thread: the pool consults the manager's cleaner
    /// and invalidation predicate, then either re-queues the resource for the
    /// next borrower or destroys it. On a disposed pool the resource is
    /// destroyed outright.
    ///
    /// A cleaner failure destroys the resource and surfaces here as
    /// [`PoolError::Cleaner`]; the pool itself stays consistent either way.
    pub fn release(mut self) -> Result<(), PoolError<M::Error>> {
        self.do_release()
    }

    fn do_release(&mut self) -> Result<(), PoolError<M::Error>> {
        let Some(slot) = self.slot.take() else {
            return Ok(());
        };
        let Some(pool) = self.pool.upgrade() else {
            // the pool is gone; the resource simply leaves custody
            let mut resource = slot.resource;
            close_discarded(&mut resource);
            return Ok(());
        };
        pool.release_slot(slot)
    }
}

impl<M: ManageResource> Drop for PooledRef<M> {
    fn drop(&mut self) {
        if self.do_release().is_err() {
            // there is no releaser to surface the failure to; the resource
            // has already been destroyed
            log::warn!("release cleaner failed while dropping a PooledRef; resource destroyed");
        }
    }
}

impl<M: ManageResource> Deref for PooledRef<M> {
    type Target = M::Resource;

    fn deref(&self) -> &M::Resource {
        self.poolable()
    }
}

impl<M: ManageResource> DerefMut for PooledRef<M> {
    fn deref_mut(&mut self) -> &mut M::Resource {
        // SAFETY: `slot` is always `Some` while the ref is held.
        &mut self.slot.as_mut().unwrap().resource
    }
}

impl<M: ManageResource> AsRef<M::Resource> for PooledRef<M> {
    fn as_ref(&self) -> &M::Resource {
        self
    }
}

impl<M: ManageResource> AsMut<M::Resource> for PooledRef<M> {
    fn as_mut(&mut self) -> &mut M::Resource {
        self
    }
}
