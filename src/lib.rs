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

#![deny(missing_docs)]

//! Drainpool is a passive, lock-free object pool for expensive, reusable
//! resources: database connections, network channels, buffers.
//!
//! The pool keeps a bounded set of live resources and hands them out one
//! borrower at a time. Acquisition is deferred: [`Pool::borrow`] returns a
//! [`Borrow`] handle that does nothing until it is subscribed with a callback
//! or awaited as a future, and then completes exactly once. The pool owns no
//! threads and takes no locks on its hot paths; all pairing of resources with
//! borrowers runs inside a serialised drain loop on the threads of its
//! callers.
//!
//! # Borrowing
//!
//! Resources are described to the pool by a [`ManageResource`] implementation:
//! how to allocate one, how to clean one on return, and when a returned one is
//! too stale to reuse.
//!
//! ```
//! use drainpool::Allocation;
//! use drainpool::ManageResource;
//! use drainpool::Pool;
//! use drainpool::PoolConfig;
//! use drainpool::Poolable;
//! use drainpool::RefStatus;
//!
//! struct Buffer(Vec<u8>);
//! impl Poolable for Buffer {}
//!
//! struct Manager;
//! impl ManageResource for Manager {
//!     type Resource = Buffer;
//!     type Error = std::convert::Infallible;
//!
//!     fn allocate(&self, allocation: Allocation<Buffer, Self::Error>) {
//!         allocation.complete(Ok(Buffer(Vec::with_capacity(1024))));
//!     }
//!
//!     fn clean(&self, buffer: &mut Buffer) -> Result<(), Self::Error> {
//!         buffer.0.clear();
//!         Ok(())
//!     }
//!
//!     fn is_stale(&self, _: &Buffer, status: &RefStatus) -> bool {
//!         status.recycle_count() >= 1000
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let pool = Pool::new(PoolConfig::new(1, 4), Manager).unwrap();
//!
//! let mut buffer = pool.borrow().await.unwrap();
//! buffer.0.extend_from_slice(b"hello");
//! buffer.release().unwrap();
//!
//! assert_eq!(pool.status().idle_count, 1);
//! pool.dispose();
//! # }
//! ```
//!
//! For request-scoped work, [`Pool::borrow_in_scope`] lends the resource to
//! one user computation and guarantees exactly one release however that
//! computation ends, including cancellation by dropping the future.
//!
//! # The delivery-thread contract
//!
//! Subscribing a [`Borrow`] with a callback pins down *which thread* hands the
//! resource over. Unless a delivery scheduler is configured, the callback runs
//! on the thread that paired this borrower with a resource:
//!
//! - the borrower's own subscribe thread, when an idle resource was ready;
//! - the allocator's completion thread, when one had to be allocated;
//! - the releasing thread, when the borrower waited for another borrower's
//!   return.
//!
//! With [`PoolConfig::with_delivery_scheduler`] every completion is instead
//! scheduled on the given [`Scheduler`]; [`SingleThread`] gives all
//! deliveries a single dedicated, named thread.
//!
//! ```
//! # use drainpool::{Allocation, ManageResource, Pool, PoolConfig, Poolable, RefStatus};
//! # use std::sync::mpsc;
//! # struct Buffer(Vec<u8>);
//! # impl Poolable for Buffer {}
//! # struct Manager;
//! # impl ManageResource for Manager {
//! #     type Resource = Buffer;
//! #     type Error = std::convert::Infallible;
//! #     fn allocate(&self, allocation: Allocation<Buffer, Self::Error>) {
//! #         allocation.complete(Ok(Buffer(Vec::new())));
//! #     }
//! #     fn clean(&self, buffer: &mut Buffer) -> Result<(), Self::Error> {
//! #         buffer.0.clear();
//! #         Ok(())
//! #     }
//! #     fn is_stale(&self, _: &Buffer, _: &RefStatus) -> bool {
//! #         false
//! #     }
//! # }
//! let pool = Pool::new(PoolConfig::new(1, 1), Manager).unwrap();
//!
//! let (tx, rx) = mpsc::channel();
//! let _handle = pool.borrow().subscribe(move |result| {
//!     // runs on the subscribing thread: the pool was warm
//!     let _ = tx.send(result);
//! });
//! let buffer = rx.recv().unwrap().unwrap();
//! buffer.release().unwrap();
//! ```
//!
//! # Cancellation
//!
//! A pending acquisition can be cancelled at any time, through
//! [`BorrowHandle::cancel`] or by dropping an awaited [`BorrowFuture`], even
//! in a race with the allocator completing or a release routing a resource to
//! it. A resource caught in that window is cleaned and offered to the next
//! waiter; nothing leaks.
//!
//! # Shutdown
//!
//! [`Pool::dispose`] is idempotent and terminal: idle resources are destroyed
//! (their [`Poolable::close`] is invoked), waiting borrowers fail with
//! [`PoolError::Shutdown`], and resources still on loan are destroyed when
//! they are released.

pub use common::Allocation;
pub use common::CloseError;
pub use common::ManageResource;
pub use common::Poolable;
pub use common::RefStatus;
pub use error::PoolError;
pub use pool::Borrow;
pub use pool::BorrowFuture;
pub use pool::BorrowHandle;
pub use pool::Pool;
pub use pool::PoolConfig;
pub use pool::PoolStatus;
pub use pool::PooledRef;
pub use scheduler::Scheduler;
pub use scheduler::SingleThread;
pub use scheduler::Task;

mod common;
mod error;
mod mutex;
mod pool;
mod scheduler;
