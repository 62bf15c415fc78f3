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

//! Weak Identity Map.
//!
//! Fixed array of power-of-two buckets keyed by a host object's address.
//! Entries live in a [`FixedPool`] owned by the caller; the map only threads
//! them into per-bucket chains through the intrusive [`WeakLink`] each
//! payload carries. New entries become the chain head, so a lookup sees the
//! most recently inserted entry for a key first.
//!
//! Addresses are snapshots. After every collector epoch [`WeakMap::rehash`]
//! must run before the next [`WeakMap::find`]: it evicts entries whose
//! target was collected and re-buckets entries whose target moved.

use crate::container::pool::{FixedPool, PoolHandle};
use crate::engine_core::constants::weak_map::KEY_ALIGNMENT_SHIFT;
use crate::engine_core::errors::WeakMapError;
use crate::engine_core::traits::WeakObject;
use crate::engine_core::types::WeakKey;

/// What one rehash pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RehashStats {
    /// Entries re-bucketed under a new identity
    pub moved: usize,
    /// Entries dropped because the host collected their target
    pub evicted: usize,
}

impl std::ops::AddAssign for RehashStats {
    fn add_assign(&mut self, other: Self) {
        self.moved += other.moved;
        self.evicted += other.evicted;
    }
}

enum Reconcile {
    Keep,
    Evict,
    Move(WeakKey),
}

#[derive(Debug)]
pub struct WeakMap {
    buckets: Box<[Option<PoolHandle>]>,
    mask: usize,
    count: usize,
}

impl WeakMap {
    /// Map with `capacity` buckets, also the maximum number of entries.
    pub fn new(capacity: usize) -> Result<Self, WeakMapError> {
        if capacity == 0 || !capacity.is_power_of_two() {
            return Err(WeakMapError::InvalidCapacity {
                requested: capacity,
            });
        }
        Ok(Self {
            buckets: vec![None; capacity].into_boxed_slice(),
            mask: capacity - 1,
            count: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Bucket for `key`, skipping the alignment bits.
    pub fn bucket_index(&self, key: WeakKey) -> usize {
        (key.addr() >> KEY_ALIGNMENT_SHIFT) & self.mask
    }

    /// Chain the pooled entry `handle` under `key`. Duplicate keys are
    /// allowed; the newest entry shadows older ones.
    pub fn insert<T: WeakObject>(
        &mut self,
        pool: &mut FixedPool<T>,
        key: WeakKey,
        handle: PoolHandle,
    ) -> Result<(), WeakMapError> {
        if !pool.contains(handle) {
            return Err(WeakMapError::InvalidArgument);
        }
        if self.count >= self.buckets.len() {
            return Err(WeakMapError::CapacityExceeded {
                capacity: self.buckets.len(),
            });
        }
        self.link_head(pool, key, handle);
        Ok(())
    }

    /// First chain entry whose stored key equals `key`, unless the host
    /// already collected it.
    pub fn find<T: WeakObject>(&self, pool: &FixedPool<T>, key: WeakKey) -> Option<PoolHandle> {
        let mut cursor = self.buckets[self.bucket_index(key)];
        while let Some(handle) = cursor {
            let obj = pool.get(handle)?;
            if obj.link().key == key {
                return if obj.is_empty() { None } else { Some(handle) };
            }
            cursor = obj.link().next;
        }
        None
    }

    /// Unlink the first entry stored under `key` and release it from the
    /// pool. Missing keys, including empty buckets, are a no-op.
    pub fn del<T: WeakObject>(&mut self, pool: &mut FixedPool<T>, key: WeakKey) -> Option<T> {
        let index = self.bucket_index(key);
        let mut prev = None;
        let mut cursor = self.buckets[index];
        while let Some(handle) = cursor {
            let (stored, next) = {
                let link = pool.get(handle)?.link();
                (link.key, link.next)
            };
            if stored == key {
                self.unlink(pool, index, prev, next);
                return pool.push(handle);
            }
            prev = Some(handle);
            cursor = next;
        }
        None
    }

    /// Reconcile every entry with the collector: evict collected targets,
    /// re-bucket moved ones.
    pub fn rehash<T: WeakObject>(&mut self, pool: &mut FixedPool<T>) -> RehashStats {
        let mut stats = RehashStats::default();
        // Relinked after the walk so a move never reshapes a chain mid-scan.
        let mut moved: Vec<(PoolHandle, WeakKey)> = Vec::new();
        for index in 0..self.buckets.len() {
            let mut prev = None;
            let mut cursor = self.buckets[index];
            while let Some(handle) = cursor {
                let Some(obj) = pool.get(handle) else {
                    // Chains only reference live slots; a dead link ends the walk.
                    break;
                };
                let next = obj.link().next;
                let action = if obj.is_empty() {
                    Reconcile::Evict
                } else {
                    let live = obj.current_key();
                    if live != obj.link().key {
                        Reconcile::Move(live)
                    } else {
                        Reconcile::Keep
                    }
                };

                match action {
                    Reconcile::Keep => prev = Some(handle),
                    Reconcile::Evict => {
                        self.unlink(pool, index, prev, next);
                        pool.push(handle);
                        stats.evicted += 1;
                    }
                    Reconcile::Move(live) => {
                        self.unlink(pool, index, prev, next);
                        moved.push((handle, live));
                    }
                }
                cursor = next;
            }
        }
        stats.moved = moved.len();
        for (handle, live) in moved {
            self.link_head(pool, live, handle);
        }
        stats
    }

    /// Forget every entry without touching the pool that owns them.
    pub fn clean(&mut self) {
        self.buckets.fill(None);
        self.count = 0;
    }

    fn link_head<T: WeakObject>(&mut self, pool: &mut FixedPool<T>, key: WeakKey, handle: PoolHandle) {
        let index = self.bucket_index(key);
        if let Some(obj) = pool.get_mut(handle) {
            let link = obj.link_mut();
            link.key = key;
            link.next = self.buckets[index];
            self.buckets[index] = Some(handle);
            self.count += 1;
        }
    }

    fn unlink<T: WeakObject>(
        &mut self,
        pool: &mut FixedPool<T>,
        index: usize,
        prev: Option<PoolHandle>,
        next: Option<PoolHandle>,
    ) {
        match prev {
            None => self.buckets[index] = next,
            Some(prev) => {
                if let Some(prev) = pool.get_mut(prev) {
                    prev.link_mut().next = next;
                }
            }
        }
        self.count -= 1;
    }
}
