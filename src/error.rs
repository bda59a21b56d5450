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

use std::fmt;

/// The error returned by acquisitions and releases.
///
/// `E` is the manager's error type ([`ManageResource::Error`]); it travels
/// inside the variants so that callers can inspect the underlying failure.
///
/// [`ManageResource::Error`]: crate::ManageResource::Error
#[derive(Debug, PartialEq, Eq)]
pub enum PoolError<E> {
    /// The pool was shut down before or while the operation ran.
    ///
    /// The display form of this variant is exactly `"Pool has been shut
    /// down"`; it is part of the pool's contract and safe to assert on.
    Shutdown,

    /// The allocation triggered by this acquisition failed.
    ///
    /// The failed allocation never counts toward the pool's live size, and
    /// exactly one borrower (the one that triggered it) observes the error.
    Allocator(E),

    /// The release cleaner failed.
    ///
    /// The resource has already been destroyed; it is never returned to the
    /// pool behind a broken cleaner.
    Cleaner(E),
}

impl<E> fmt::Display for PoolError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::Shutdown => write!(f, "Pool has been shut down"),
            PoolError::Allocator(_) => write!(f, "allocator failed to produce a resource"),
            PoolError::Cleaner(_) => write!(f, "release cleaner failed; resource destroyed"),
        }
    }
}

impl<E: fmt::Debug> std::error::Error for PoolError<E> {}

impl<E> PoolError<E> {
    /// Returns the manager error carried by this error, if any.
    pub fn into_inner(self) -> Option<E> {
        match self {
            PoolError::Shutdown => None,
            PoolError::Allocator(e) => Some(e),
            PoolError::Cleaner(e) => Some(e),
        }
    }
}
