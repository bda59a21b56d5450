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

//! Tests for the scoped borrowing surface: the resource is lent to one user
//! computation and released exactly once, however that computation ends.

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use drainpool::Allocation;
use drainpool::ManageResource;
use drainpool::Pool;
use drainpool::PoolConfig;
use drainpool::PoolError;
use drainpool::Poolable;
use drainpool::RefStatus;

#[derive(Default)]
struct Counters {
    created: AtomicUsize,
    cleaned: AtomicUsize,
}

struct Phrase {
    text: String,
    derived: usize,
}

impl Poolable for Phrase {}

struct Manager {
    counters: Arc<Counters>,
    clean_error: Option<&'static str>,
}

impl Manager {
    fn new(counters: Arc<Counters>) -> Self {
        Self {
            counters,
            clean_error: None,
        }
    }
}

impl ManageResource for Manager {
    type Resource = Phrase;
    type Error = String;

    fn allocate(&self, allocation: Allocation<Phrase, String>) {
        self.counters.created.fetch_add(1, Ordering::SeqCst);
        allocation.complete(Ok(Phrase {
            text: "hello reactive world".to_string(),
            derived: 0,
        }));
    }

    fn clean(&self, resource: &mut Phrase) -> Result<(), String> {
        if let Some(msg) = self.clean_error {
            return Err(msg.to_string());
        }
        resource.derived = 0;
        self.counters.cleaned.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_stale(&self, _resource: &Phrase, _status: &RefStatus) -> bool {
        false
    }
}

#[tokio::test]
async fn test_borrow_await_round_trip() {
    let counters = Arc::new(Counters::default());
    let pool = Pool::new(PoolConfig::new(1, 1), Manager::new(counters.clone())).unwrap();

    let mut phrase = pool.borrow().await.unwrap();
    phrase.derived = 7;
    phrase.release().unwrap();

    assert_eq!(counters.cleaned.load(Ordering::SeqCst), 1);
    assert_eq!(pool.status().idle_count, 1);
}

/// Derive a value from the resource inside the scope; the resource is back in
/// the pool by the time the value is observed.
#[tokio::test]
async fn test_scoped_derivation_releases_afterwards() {
    let counters = Arc::new(Counters::default());
    let pool = Pool::new(PoolConfig::new(0, 1), Manager::new(counters.clone())).unwrap();

    let words = pool
        .borrow_in_scope(async |phrase: &mut Phrase| {
            phrase.derived = phrase.text.split(' ').count();
            phrase.derived
        })
        .await
        .unwrap();

    assert_eq!(words, 3);
    assert_eq!(counters.created.load(Ordering::SeqCst), 1);
    assert_eq!(counters.cleaned.load(Ordering::SeqCst), 1);
    let status = pool.status();
    assert_eq!(status.live, 1);
    assert_eq!(status.idle_count, 1);
}

/// Cancelling the scope mid-computation still releases the resource.
#[tokio::test]
async fn test_cancelled_scope_releases_the_resource() {
    let counters = Arc::new(Counters::default());
    let pool = Pool::new(PoolConfig::new(1, 1), Manager::new(counters.clone())).unwrap();

    let scope = pool.borrow_in_scope(async |_phrase: &mut Phrase| {
        tokio::time::sleep(Duration::from_millis(100)).await;
    });
    let timed_out = tokio::time::timeout(Duration::from_millis(10), scope).await;
    assert!(timed_out.is_err(), "scope should have been cancelled");

    for _ in 0..200 {
        if counters.cleaned.load(Ordering::SeqCst) == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(counters.cleaned.load(Ordering::SeqCst), 1);
    assert_eq!(pool.status().idle_count, 1);
}

/// A scope on a disposed pool fails with the shutdown error before the user
/// computation runs.
#[tokio::test]
async fn test_scope_on_disposed_pool_fails() {
    let counters = Arc::new(Counters::default());
    let pool = Pool::new(PoolConfig::new(0, 1), Manager::new(counters.clone())).unwrap();
    pool.dispose();

    let result = pool
        .borrow_in_scope(async |_phrase: &mut Phrase| {
            panic!("user computation must not run");
        })
        .await;

    match result {
        Err(err) => assert_eq!(err.to_string(), "Pool has been shut down"),
        Ok(()) => panic!("scope on a disposed pool must fail"),
    }
}

/// A cleaner failure on the final release surfaces from the scope.
#[tokio::test]
async fn test_cleaner_failure_surfaces_from_the_scope() {
    let counters = Arc::new(Counters::default());
    let manager = Manager {
        clean_error: Some("boom"),
        ..Manager::new(counters.clone())
    };
    let pool = Pool::new(PoolConfig::new(0, 1), manager).unwrap();

    let result = pool.borrow_in_scope(async |_phrase: &mut Phrase| 42).await;

    assert_eq!(result, Err(PoolError::Cleaner("boom".to_string())));
    let status = pool.status();
    assert_eq!(status.live, 0);
    assert_eq!(status.idle_count, 0);
}
