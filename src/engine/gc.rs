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

//! Collector hooks.
//!
//! The host calls [`on_gc_epilogue`] after every scavenge and mark-sweep-
//! compact pass, and [`dispatch_weak_callbacks`] with the tokens of strings
//! it reclaimed. Both run on the host thread between client operations.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::container::weak_map::RehashStats;
use crate::engine::manager::TransactionManager;
use crate::engine_core::traits::HostWeakRef;
use crate::engine_core::types::WeakCallbackToken;

/// Collector pass that just finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GcEpoch {
    Scavenge,
    MarkSweepCompact,
}

/// Reconcile every transaction with the heap. Must complete before the next
/// lookup.
pub fn on_gc_epilogue<R: HostWeakRef>(
    manager: &mut TransactionManager<R>,
    epoch: GcEpoch,
) -> RehashStats {
    let stats = manager.rehash_all();
    debug!(
        ?epoch,
        transactions = manager.size(),
        moved = stats.moved,
        evicted = stats.evicted,
        "GC epilogue"
    );
    stats
}

/// Mark the referenced tainted objects as collected. Returns how many tokens
/// still matched a live object; the rest belonged to removed transactions or
/// already-evicted objects.
pub fn dispatch_weak_callbacks<R, I>(manager: &mut TransactionManager<R>, tokens: I) -> usize
where
    R: HostWeakRef,
    I: IntoIterator<Item = WeakCallbackToken>,
{
    tokens
        .into_iter()
        .filter(|token| manager.on_weak_collected(*token))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Limits;
    use crate::engine_core::traits::HostString;
    use crate::engine_core::types::TransactionKey;
    use crate::host::sim::{SimHeap, SimWeak};

    #[test]
    fn test_epilogue_rehashes_all_transactions() {
        let heap = SimHeap::new();
        let mut manager: TransactionManager<SimWeak> =
            TransactionManager::new(Limits::new(8, 2).unwrap(), 2);

        let mut strings = Vec::new();
        for key in [1usize, 2] {
            let tx = manager.new_transaction(TransactionKey::new(key)).unwrap();
            let s = heap.alloc("tainted");
            let info = tx.create_new_input_info("p", "tainted", "t").unwrap();
            let r = tx.get_range(0, 7, info, 0).unwrap();
            let v = tx.get_shared_vector_range().unwrap();
            v.push_back(r);
            tx.add_tainted(s.identity(), v, &s).unwrap();
            strings.push(s);
        }

        heap.relocate(&strings[0], 0x9000);
        heap.collect(&strings[1]);
        assert_eq!(dispatch_weak_callbacks(&mut manager, heap.drain_weak_callbacks()), 1);

        let stats = on_gc_epilogue(&mut manager, GcEpoch::MarkSweepCompact);
        assert_eq!(stats, RehashStats { moved: 1, evicted: 1 });

        let tx1 = manager.get(TransactionKey::new(1)).unwrap();
        assert!(tx1.find_tainted_object(strings[0].identity()).is_some());
        assert_eq!(manager.get(TransactionKey::new(2)).unwrap().tainted_count(), 0);
    }

    #[test]
    fn test_callbacks_for_removed_transaction_ignored() {
        let heap = SimHeap::new();
        let mut manager: TransactionManager<SimWeak> =
            TransactionManager::new(Limits::new(8, 2).unwrap(), 2);
        let key = TransactionKey::new(1);
        let s = heap.alloc("x");
        {
            let tx = manager.new_transaction(key).unwrap();
            let v = tx.get_shared_vector_range().unwrap();
            tx.add_tainted(s.identity(), v, &s).unwrap();
        }
        manager.remove(key);
        heap.collect(&s);
        assert_eq!(dispatch_weak_callbacks(&mut manager, heap.drain_weak_callbacks()), 0);
        assert_eq!(on_gc_epilogue(&mut manager, GcEpoch::Scavenge), RehashStats::default());
    }
}
