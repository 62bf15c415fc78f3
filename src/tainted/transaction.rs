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

//! Transaction.
//!
//! All taint state of one logical request: the weak map of tainted strings,
//! the pools their ranges and range vectors come from, and the input infos
//! the ranges point at. Everything is sized from [`Limits`] up front and
//! released in bulk by [`Transaction::clean`].

use tracing::debug;

use crate::config::Limits;
use crate::container::pool::{FixedPool, PoolHandle};
use crate::container::queued_pool::QueuedPool;
use crate::container::shared_vector::SharedVector;
use crate::container::weak_map::{RehashStats, WeakMap};
use crate::engine_core::errors::{PoolError, TaintError};
use crate::engine_core::traits::{HostString, HostWeakRef};
use crate::engine_core::types::{TransactionKey, WeakCallbackToken, WeakKey};
use crate::tainted::input_info::{InputInfo, InputInfoId};
use crate::tainted::range::{Range, RangeHandle, SecureMarks, SharedRanges};
use crate::tainted::tainted_object::TaintedObject;

#[derive(Debug)]
pub struct Transaction<R> {
    instance_id: usize,
    key: TransactionKey,
    limits: Limits,
    map: WeakMap,
    tainted: FixedPool<TaintedObject<R>>,
    ranges: FixedPool<Range>,
    vectors: QueuedPool<SharedRanges>,
    vectors_in_use: Box<[Option<SharedRanges>]>,
    input_infos: Vec<InputInfo>,
}

impl<R: HostWeakRef> Transaction<R> {
    pub fn new(key: TransactionKey, instance_id: usize, limits: Limits) -> Result<Self, TaintError> {
        Ok(Self {
            instance_id,
            key,
            limits,
            map: WeakMap::new(limits.max_tainted_objects())?,
            tainted: FixedPool::new(limits.max_tainted_objects()),
            ranges: FixedPool::new(limits.max_global_ranges()),
            vectors: QueuedPool::with_cap(limits.max_range_vectors()),
            vectors_in_use: vec![None; limits.max_range_vectors()].into_boxed_slice(),
            input_infos: Vec::new(),
        })
    }

    /// Identifies the pooled instance across recycling.
    pub fn instance_id(&self) -> usize {
        self.instance_id
    }

    pub fn key(&self) -> TransactionKey {
        self.key
    }

    /// Rebind a recycled transaction to a new request.
    pub(crate) fn bind(&mut self, key: TransactionKey) {
        self.key = key;
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    // ------------------------------------------------------------------
    // Input infos
    // ------------------------------------------------------------------

    pub fn create_new_input_info(
        &mut self,
        parameter_name: &str,
        parameter_value: &str,
        origin_type: &str,
    ) -> Result<InputInfoId, TaintError> {
        let capacity = self.limits.max_input_infos();
        if self.input_infos.len() >= capacity {
            return Err(TaintError::InputInfoLimit { capacity });
        }
        let id = InputInfoId::new(self.input_infos.len() as u32);
        self.input_infos
            .push(InputInfo::new(parameter_name, parameter_value, origin_type));
        Ok(id)
    }

    pub fn input_info(&self, id: InputInfoId) -> Option<&InputInfo> {
        self.input_infos.get(id.index())
    }

    pub fn input_info_count(&self) -> usize {
        self.input_infos.len()
    }

    // ------------------------------------------------------------------
    // Ranges
    // ------------------------------------------------------------------

    pub fn get_range(
        &mut self,
        start: usize,
        end: usize,
        input_info: InputInfoId,
        secure_marks: SecureMarks,
    ) -> Result<RangeHandle, TaintError> {
        if start > end {
            return Err(TaintError::InvalidRange { start, end });
        }
        Ok(self
            .ranges
            .pop(Range::new(start, end, input_info, secure_marks))?)
    }

    pub fn range(&self, handle: RangeHandle) -> Option<Range> {
        self.ranges.get(handle).copied()
    }

    /// OR `marks` into a pooled range in place. Every vector sharing the
    /// range observes the change.
    pub fn add_secure_marks(&mut self, handle: RangeHandle, marks: SecureMarks) -> Result<(), TaintError> {
        let range = self.ranges.get_mut(handle).ok_or(PoolError::StaleHandle)?;
        range.secure_marks |= marks;
        Ok(())
    }

    /// Resolve every handle in `ranges`, in order.
    pub fn snapshot(&self, ranges: &SharedRanges) -> Vec<(RangeHandle, Range)> {
        ranges
            .as_slice()
            .iter()
            .filter_map(|h| self.ranges.get(*h).map(|r| (*h, *r)))
            .collect()
    }

    pub fn range_count(&self) -> usize {
        self.ranges.len()
    }

    /// A cleared range vector, reused when one is idle.
    pub fn get_shared_vector_range(&mut self) -> Result<SharedRanges, TaintError> {
        let vector = self.vectors.pop_or_else(SharedVector::new)?;
        vector.clear();
        if let Some(slot) = self.vectors_in_use.get_mut(vector.id()) {
            *slot = Some(vector.clone());
        }
        Ok(vector)
    }

    pub fn vectors_in_use(&self) -> usize {
        self.vectors_in_use.iter().filter(|v| v.is_some()).count()
    }

    // ------------------------------------------------------------------
    // Tainted objects
    // ------------------------------------------------------------------

    pub fn find_tainted_object(&self, key: WeakKey) -> Option<&TaintedObject<R>> {
        self.map
            .find(&self.tainted, key)
            .and_then(|h| self.tainted.get(h))
    }

    /// Ranges of the string currently known under `key`.
    pub fn ranges_of(&self, key: WeakKey) -> Option<SharedRanges> {
        self.find_tainted_object(key)
            .and_then(|obj| obj.ranges().cloned())
    }

    /// Record `value`, currently identified by `key`, as tainted by `ranges`
    /// and watch it for collection.
    pub fn add_tainted<S>(
        &mut self,
        key: WeakKey,
        ranges: SharedRanges,
        value: &S,
    ) -> Result<PoolHandle, TaintError>
    where
        S: HostString<Weak = R>,
    {
        let transaction = self.key;
        let handle = self.tainted.pop_with(|object| {
            let target = value.downgrade(WeakCallbackToken {
                transaction,
                object,
            });
            TaintedObject::new(key, ranges, target)
        })?;
        if let Err(e) = self.map.insert(&mut self.tainted, key, handle) {
            self.tainted.push(handle);
            return Err(e.into());
        }
        Ok(handle)
    }

    /// Live tainted objects in pool order.
    pub fn iter_tainted(&self) -> impl Iterator<Item = &TaintedObject<R>> + '_ {
        self.tainted.iter().map(|(_, obj)| obj)
    }

    pub fn tainted_count(&self) -> usize {
        self.tainted.len()
    }

    // ------------------------------------------------------------------
    // Collector coordination
    // ------------------------------------------------------------------

    /// Weak callback for one of this transaction's objects. Stale handles
    /// (object already evicted or transaction recycled) are ignored.
    pub fn on_weak_collected(&mut self, object: PoolHandle) -> bool {
        match self.tainted.get_mut(object) {
            Some(obj) => {
                obj.mark_collected();
                true
            }
            None => false,
        }
    }

    /// Follow the collector: re-bucket moved strings, evict collected ones,
    /// then hand range vectors nobody references back to the vector pool.
    pub fn rehash_map(&mut self) -> RehashStats {
        let stats = self.map.rehash(&mut self.tainted);

        let mut reclaimed = 0usize;
        for slot in self.vectors_in_use.iter_mut() {
            let unused = slot.as_ref().is_some_and(|v| v.ref_count() == 1);
            if unused {
                if let Some(vector) = slot.take() {
                    vector.clear();
                    self.vectors.push(vector);
                    reclaimed += 1;
                }
            }
        }

        if stats != RehashStats::default() || reclaimed > 0 {
            debug!(
                transaction = %self.key,
                moved = stats.moved,
                evicted = stats.evicted,
                vectors_reclaimed = reclaimed,
                "Rehashed taint map"
            );
        }
        stats
    }

    /// Release everything the transaction allocated. Safe to repeat.
    pub fn clean(&mut self) {
        self.map.clean();
        self.tainted.clear();
        self.ranges.clear();
        for slot in self.vectors_in_use.iter_mut() {
            if let Some(vector) = slot.take() {
                vector.clear();
                self.vectors.push(vector);
            }
        }
        self.input_infos.clear();
    }

    /// Entries in the weak map, including collected ones awaiting rehash.
    pub fn map_len(&self) -> usize {
        self.map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::sim::{SimHeap, SimWeak};

    fn small() -> Transaction<SimWeak> {
        Transaction::new(TransactionKey::new(0xbeef), 0, Limits::new(8, 4).unwrap()).unwrap()
    }

    fn taint(tx: &mut Transaction<SimWeak>, s: &crate::host::sim::SimString, name: &str) {
        let info = tx.create_new_input_info(name, &s.to_utf8(), "http.request.parameter").unwrap();
        let r = tx.get_range(0, s.len_utf16(), info, 0).unwrap();
        let v = tx.get_shared_vector_range().unwrap();
        v.push_back(r);
        tx.add_tainted(s.identity(), v, s).unwrap();
    }

    #[test]
    fn test_add_and_find() {
        let heap = SimHeap::new();
        let mut tx = small();
        let s = heap.alloc_at(0x1000, "alice");
        taint(&mut tx, &s, "user.name");

        let obj = tx.find_tainted_object(WeakKey::new(0x1000)).unwrap();
        assert_eq!(obj.key(), WeakKey::new(0x1000));
        let ranges = tx.snapshot(obj.ranges().unwrap());
        assert_eq!(ranges.len(), 1);
        assert_eq!((ranges[0].1.start, ranges[0].1.end), (0, 5));
        let info = tx.input_info(ranges[0].1.input_info).unwrap();
        assert_eq!(info.parameter_name, "user.name");
        assert_eq!(tx.tainted_count(), 1);
    }

    #[test]
    fn test_invalid_range_rejected() {
        let mut tx = small();
        let info = tx.create_new_input_info("a", "b", "c").unwrap();
        assert_eq!(
            tx.get_range(5, 2, info, 0),
            Err(TaintError::InvalidRange { start: 5, end: 2 })
        );
        assert_eq!(tx.range_count(), 0);
    }

    #[test]
    fn test_range_pool_exhaustion_is_recoverable() {
        let mut tx = small();
        let info = tx.create_new_input_info("a", "b", "c").unwrap();
        for i in 0..tx.limits().max_global_ranges() {
            tx.get_range(i, i + 1, info, 0).unwrap();
        }
        let err = tx.get_range(0, 1, info, 0).unwrap_err();
        assert!(err.is_exhaustion());
    }

    #[test]
    fn test_object_and_vector_exhaustion() {
        let heap = SimHeap::new();
        let mut tx = Transaction::new(TransactionKey::new(1), 0, Limits::new(1, 4).unwrap()).unwrap();
        let a = heap.alloc("a");
        let b = heap.alloc("b");
        taint(&mut tx, &a, "a");

        // One range vector per tainted object.
        assert!(tx.get_shared_vector_range().unwrap_err().is_exhaustion());

        let shared = tx.ranges_of(a.identity()).unwrap();
        let err = tx.add_tainted(b.identity(), shared, &b).unwrap_err();
        assert!(err.is_exhaustion());
        assert_eq!(tx.tainted_count(), 1);
        assert_eq!(tx.map_len(), 1);
        assert!(tx.find_tainted_object(b.identity()).is_none());
    }

    #[test]
    fn test_input_info_limit() {
        let mut tx = small();
        for i in 0..8 {
            tx.create_new_input_info(&i.to_string(), "v", "t").unwrap();
        }
        assert_eq!(
            tx.create_new_input_info("x", "v", "t"),
            Err(TaintError::InputInfoLimit { capacity: 8 })
        );
    }

    #[test]
    fn test_secure_marks_shared_through_handle() {
        let mut tx = small();
        let info = tx.create_new_input_info("a", "b", "c").unwrap();
        let h = tx.get_range(0, 3, info, 0b01).unwrap();
        tx.add_secure_marks(h, 0b10).unwrap();
        assert_eq!(tx.range(h).unwrap().secure_marks, 0b11);

        tx.clean();
        assert_eq!(
            tx.add_secure_marks(h, 0b100),
            Err(TaintError::Pool(PoolError::StaleHandle))
        );
    }

    #[test]
    fn test_weak_callback_then_rehash_evicts() {
        let heap = SimHeap::new();
        let mut tx = small();
        let s = heap.alloc("alice");
        taint(&mut tx, &s, "user.name");
        assert_eq!(tx.vectors_in_use(), 1);

        heap.collect(&s);
        for token in heap.drain_weak_callbacks() {
            assert_eq!(token.transaction, tx.key());
            assert!(tx.on_weak_collected(token.object));
        }
        assert!(tx.find_tainted_object(s.identity()).is_none());
        assert_eq!(tx.map_len(), 1);

        let stats = tx.rehash_map();
        assert_eq!(stats.evicted, 1);
        assert_eq!(tx.map_len(), 0);
        assert_eq!(tx.tainted_count(), 0);
        assert_eq!(tx.vectors_in_use(), 0);
    }

    #[test]
    fn test_rehash_follows_relocation() {
        let heap = SimHeap::new();
        let mut tx = small();
        let s = heap.alloc_at(0x1000, "alice");
        taint(&mut tx, &s, "user.name");

        heap.relocate(&s, 0x3000);
        assert!(tx.find_tainted_object(WeakKey::new(0x3000)).is_none());
        assert_eq!(tx.rehash_map().moved, 1);
        assert!(tx.find_tainted_object(WeakKey::new(0x3000)).is_some());
        assert!(tx.find_tainted_object(WeakKey::new(0x1000)).is_none());
        // Still referenced by the tainted object.
        assert_eq!(tx.vectors_in_use(), 1);
    }

    #[test]
    fn test_clean_twice_is_idempotent() {
        let heap = SimHeap::new();
        let mut tx = small();
        for text in ["a", "bb", "ccc"] {
            let s = heap.alloc(text);
            taint(&mut tx, &s, text);
        }
        assert_eq!(tx.tainted_count(), 3);

        tx.clean();
        let after_first = (tx.map_len(), tx.tainted_count(), tx.range_count(), tx.vectors_in_use(), tx.input_info_count());
        tx.clean();
        let after_second = (tx.map_len(), tx.tainted_count(), tx.range_count(), tx.vectors_in_use(), tx.input_info_count());
        assert_eq!(after_first, (0, 0, 0, 0, 0));
        assert_eq!(after_first, after_second);

        // Pools are fully usable again.
        let s = heap.alloc("again");
        taint(&mut tx, &s, "again");
        assert_eq!(tx.tainted_count(), 1);
    }

    #[test]
    fn test_stale_callback_after_clean_ignored() {
        let heap = SimHeap::new();
        let mut tx = small();
        let s = heap.alloc("alice");
        taint(&mut tx, &s, "user.name");
        tx.clean();

        heap.collect(&s);
        let tokens = heap.drain_weak_callbacks();
        assert_eq!(tokens.len(), 1);
        assert!(!tx.on_weak_collected(tokens[0].object));
    }
}
