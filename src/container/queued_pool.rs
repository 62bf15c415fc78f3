// Copyright 2026 BadCompany
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

//! Queued Pool.
//!
//! Recycles heavier objects by identity. Instances are constructed lazily,
//! up to an optional cap, and parked in a FIFO queue when returned. A
//! recycled instance comes back exactly as it was pushed: resetting its
//! state is the caller's job.

use std::collections::VecDeque;

use crate::engine_core::errors::PoolError;

#[derive(Debug)]
pub struct QueuedPool<T> {
    idle: VecDeque<T>,
    created: usize,
    cap: Option<usize>,
}

impl<T> QueuedPool<T> {
    /// Pool without an instance cap.
    pub fn new() -> Self {
        Self {
            idle: VecDeque::new(),
            created: 0,
            cap: None,
        }
    }

    /// Pool that never constructs more than `cap` instances.
    pub fn with_cap(cap: usize) -> Self {
        Self {
            idle: VecDeque::with_capacity(cap),
            created: 0,
            cap: Some(cap),
        }
    }

    /// Reuse the oldest idle instance, or construct one with `make` when
    /// none is idle and the cap allows it. `make` receives the number of
    /// instances constructed before this one.
    pub fn pop_or_else<F>(&mut self, make: F) -> Result<T, PoolError>
    where
        F: FnOnce(usize) -> T,
    {
        self.try_pop_or_else(|n| Ok(make(n)))
    }

    /// Like [`QueuedPool::pop_or_else`] for constructors that can fail. A
    /// failed construction is not counted.
    pub fn try_pop_or_else<F, E>(&mut self, make: F) -> Result<T, E>
    where
        F: FnOnce(usize) -> Result<T, E>,
        E: From<PoolError>,
    {
        if let Some(item) = self.idle.pop_front() {
            return Ok(item);
        }
        if let Some(cap) = self.cap {
            if self.created >= cap {
                return Err(PoolError::Exhausted { capacity: cap }.into());
            }
        }
        let item = make(self.created)?;
        self.created += 1;
        Ok(item)
    }

    /// Park an instance for reuse.
    pub fn push(&mut self, item: T) {
        self.idle.push_back(item);
    }

    /// Drop every idle instance. Instances currently handed out stay
    /// counted in `size`.
    pub fn clear(&mut self) {
        self.created = self.created.saturating_sub(self.idle.len());
        self.idle.clear();
    }

    /// Instances constructed and not dropped by `clear`.
    pub fn size(&self) -> usize {
        self.created
    }

    /// Idle instances ready for reuse.
    pub fn available(&self) -> usize {
        self.idle.len()
    }

    pub fn cap(&self) -> Option<usize> {
        self.cap
    }
}

impl<T> Default for QueuedPool<T> {
    fn default() -> Self {
        Self::new()
    }
}
