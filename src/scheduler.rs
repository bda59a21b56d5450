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

//! The execution-context seam used for borrower delivery.
//!
//! The pool itself owns no threads. When a [`PoolConfig`](crate::PoolConfig)
//! carries a delivery scheduler, every acquisition completion is handed to it
//! instead of running on the thread that happened to pair the resource with
//! the borrower. Anything that can run a boxed closure can be a scheduler; the
//! crate ships [`SingleThread`] for the common case of one dedicated,
//! named delivery thread.

use std::io;
use std::sync::mpsc;
use std::thread;

/// A unit of work handed to a [`Scheduler`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// An execution context that can run units of work.
pub trait Scheduler: Send + Sync {
    /// Schedules `task` to run on this context.
    ///
    /// Tasks scheduled from a single thread must run in the order they were
    /// scheduled.
    fn schedule(&self, task: Task);
}

/// A [`Scheduler`] backed by one dedicated worker thread.
///
/// Tasks run in FIFO order on a thread carrying the given name, which makes
/// this scheduler convenient as a delivery context: every borrower completion
/// lands on the same, identifiable thread.
///
/// Dropping the scheduler stops the worker once the queued tasks have run;
/// tasks scheduled after that are dropped with a WARN.
pub struct SingleThread {
    sender: mpsc::Sender<Task>,
}

impl std::fmt::Debug for SingleThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleThread").finish_non_exhaustive()
    }
}

impl SingleThread {
    /// Spawns the worker thread with the given name.
    pub fn new(name: impl Into<String>) -> io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<Task>();
        thread::Builder::new().name(name.into()).spawn(move || {
            while let Ok(task) = receiver.recv() {
                task();
            }
        })?;
        Ok(Self { sender })
    }
}

impl Scheduler for SingleThread {
    fn schedule(&self, task: Task) {
        if self.sender.send(task).is_err() {
            log::warn!("delivery scheduler worker is gone; task dropped");
        }
    }
}
