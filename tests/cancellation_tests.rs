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

//! Tests around cancelling acquisitions, including races with the allocator
//! and with releases. The accounting invariant throughout: once the dust
//! settles, every created resource has been cleaned or destroyed; cancelling
//! never leaks.

use std::future::IntoFuture;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use drainpool::Allocation;
use drainpool::ManageResource;
use drainpool::Pool;
use drainpool::PoolConfig;
use drainpool::Poolable;
use drainpool::PooledRef;
use drainpool::RefStatus;

#[derive(Default)]
struct Counters {
    created: AtomicUsize,
    cleaned: AtomicUsize,
}

struct TestResource;

impl Poolable for TestResource {}

struct Manager {
    counters: Arc<Counters>,
    allocation_delay: Option<Duration>,
}

impl ManageResource for Manager {
    type Resource = TestResource;
    type Error = String;

    fn allocate(&self, allocation: Allocation<TestResource, String>) {
        let counters = self.counters.clone();
        let make = move || {
            counters.created.fetch_add(1, Ordering::SeqCst);
            TestResource
        };
        match self.allocation_delay {
            None => allocation.complete(Ok(make())),
            Some(delay) => {
                thread::Builder::new()
                    .name("allocator".to_string())
                    .spawn(move || {
                        thread::sleep(delay);
                        allocation.complete(Ok(make()));
                    })
                    .unwrap();
            }
        }
    }

    fn clean(&self, _resource: &mut TestResource) -> Result<(), String> {
        self.counters.cleaned.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_stale(&self, _resource: &TestResource, _status: &RefStatus) -> bool {
        false
    }
}

fn borrow_now(pool: &Arc<Pool<Manager>>) -> PooledRef<Manager> {
    let (tx, rx) = mpsc::channel();
    pool.borrow().subscribe(move |result| {
        let _ = tx.send(result);
    });
    rx.recv_timeout(Duration::from_secs(1)).unwrap().unwrap()
}

fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("condition not reached within one second");
}

/// A release routed to a cancelled borrower cleans the resource a second time
/// and hands it to the pool, not to the borrower.
#[test]
fn test_returned_resource_released_if_borrower_cancelled() {
    let counters = Arc::new(Counters::default());
    let manager = Manager {
        counters: counters.clone(),
        allocation_delay: None,
    };
    let pool = Pool::new(PoolConfig::new(1, 1), manager).unwrap();

    // take the only resource, then cancel a second borrower
    let unique = borrow_now(&pool);
    let handle = pool.borrow().subscribe(|_| {
        panic!("cancelled borrower must never be completed");
    });
    handle.cancel();

    assert_eq!(counters.cleaned.load(Ordering::SeqCst), 0);

    // the release pairs the resource with the cancelled borrower, which
    // forwards it straight back through the release path
    unique.release().unwrap();

    assert_eq!(counters.cleaned.load(Ordering::SeqCst), 2);
    assert_eq!(counters.created.load(Ordering::SeqCst), 1);
    let status = pool.status();
    assert_eq!(status.idle_count, 1);
    assert_eq!(status.live, 1);
}

/// Cancelling while the allocator is still working: the late resource is
/// cleaned and kept, not leaked.
#[test]
fn test_allocated_resource_released_if_borrower_cancelled() {
    let counters = Arc::new(Counters::default());
    let manager = Manager {
        counters: counters.clone(),
        allocation_delay: Some(Duration::from_millis(50)),
    };
    let pool = Pool::new(PoolConfig::new(0, 1), manager).unwrap();

    let handle = pool.borrow().subscribe(|_| {
        panic!("cancelled borrower must never be completed");
    });
    handle.cancel();

    eventually(|| counters.cleaned.load(Ordering::SeqCst) == 1);
    assert_eq!(counters.created.load(Ordering::SeqCst), 1);
    assert_eq!(pool.status().idle_count, 1);
}

/// Cancel racing the allocator completion, many rounds: whichever side wins,
/// cleaned catches up with created.
#[test]
fn test_cancel_vs_allocation_race() {
    for round in 0..50 {
        let counters = Arc::new(Counters::default());
        let manager = Manager {
            counters: counters.clone(),
            allocation_delay: Some(Duration::from_millis(1)),
        };
        let pool = Pool::new(PoolConfig::new(0, 1), manager).unwrap();

        let handle = pool.borrow().subscribe(|result| {
            // a delivery that beat the cancel; returning the ref is the
            // borrower's job, and dropping it does exactly that
            drop(result);
        });

        if round % 2 == 0 {
            handle.cancel();
        } else {
            let racer = thread::spawn(move || {
                handle.cancel();
            });
            racer.join().unwrap();
        }

        eventually(|| {
            let created = counters.created.load(Ordering::SeqCst);
            created == 1 && counters.cleaned.load(Ordering::SeqCst) == created
        });
    }
}

/// Cancellation as async callers express it: a timed-out borrow drops the
/// future, and the in-flight allocation still lands in the pool.
#[tokio::test]
async fn test_timed_out_borrow_releases_the_allocation() {
    let counters = Arc::new(Counters::default());
    let manager = Manager {
        counters: counters.clone(),
        allocation_delay: Some(Duration::from_millis(50)),
    };
    let pool = Pool::new(PoolConfig::new(0, 1), manager).unwrap();

    let timed_out = tokio::time::timeout(Duration::from_millis(5), pool.borrow()).await;
    assert!(timed_out.is_err(), "borrow should have timed out");

    for _ in 0..200 {
        if counters.cleaned.load(Ordering::SeqCst) == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(counters.created.load(Ordering::SeqCst), 1);
    assert_eq!(counters.cleaned.load(Ordering::SeqCst), 1);
    assert_eq!(pool.status().idle_count, 1);
}

/// Dropping a future after the resource was already handed off returns the
/// resource to the pool.
#[test]
fn test_dropping_a_completed_future_returns_the_resource() {
    let counters = Arc::new(Counters::default());
    let manager = Manager {
        counters: counters.clone(),
        allocation_delay: None,
    };
    let pool = Pool::new(PoolConfig::new(1, 1), manager).unwrap();

    // subscribing through the future adapter delivers synchronously here; the
    // un-polled result is returned when the future drops
    let future = pool.borrow().into_future();
    drop(future);

    assert_eq!(counters.cleaned.load(Ordering::SeqCst), 1);
    assert_eq!(pool.status().idle_count, 1);
}
