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

//! Simulated host heap.
//!
//! Strings get 8-byte aligned addresses that the "collector" can change
//! ([`SimHeap::relocate`]) or invalidate ([`SimHeap::collect`]). Collecting
//! a string queues one weak callback token per weak reference ever taken on
//! it; the embedder drains them with [`SimHeap::drain_weak_callbacks`] and
//! feeds them to the transaction manager, as a real GC epilogue would.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::engine_core::traits::{HostString, HostWeakRef};
use crate::engine_core::types::{WeakCallbackToken, WeakKey};

const BASE_ADDRESS: usize = 0x1000;
const ALIGNMENT: usize = 8;

#[derive(Debug)]
struct SimObject {
    addr: usize,
    text: String,
    alive: bool,
    watchers: Vec<WeakCallbackToken>,
}

#[derive(Debug)]
struct HeapState {
    next_addr: usize,
    next_id: u64,
    objects: HashMap<u64, SimObject>,
    pending: Vec<WeakCallbackToken>,
}

#[derive(Debug, Clone)]
pub struct SimHeap {
    state: Rc<RefCell<HeapState>>,
}

/// Strong handle onto a simulated string. Clones denote the same string.
#[derive(Debug, Clone)]
pub struct SimString {
    state: Rc<RefCell<HeapState>>,
    id: u64,
}

#[derive(Debug)]
pub struct SimWeak {
    state: Rc<RefCell<HeapState>>,
    id: Option<u64>,
}

impl SimHeap {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(HeapState {
                next_addr: BASE_ADDRESS,
                next_id: 0,
                objects: HashMap::new(),
                pending: Vec::new(),
            })),
        }
    }

    /// Allocate at the next free aligned address.
    pub fn alloc(&self, text: &str) -> SimString {
        let addr = {
            let mut state = self.state.borrow_mut();
            let addr = state.next_addr;
            let size = text.len().max(1).div_ceil(ALIGNMENT) * ALIGNMENT;
            state.next_addr += size;
            addr
        };
        self.alloc_at(addr, text)
    }

    /// Allocate at a caller-chosen address. Two live strings may share an
    /// address only if the caller wants to model a collision.
    pub fn alloc_at(&self, addr: usize, text: &str) -> SimString {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.objects.insert(
            id,
            SimObject {
                addr,
                text: text.to_string(),
                alive: true,
                watchers: Vec::new(),
            },
        );
        SimString {
            state: Rc::clone(&self.state),
            id,
        }
    }

    /// Move a string, as a compacting pass would.
    pub fn relocate(&self, string: &SimString, new_addr: usize) {
        if let Some(obj) = self.state.borrow_mut().objects.get_mut(&string.id) {
            obj.addr = new_addr;
        }
    }

    /// Reclaim a string and queue its weak callbacks.
    pub fn collect(&self, string: &SimString) {
        let mut state = self.state.borrow_mut();
        let tokens = match state.objects.get_mut(&string.id) {
            Some(obj) if obj.alive => {
                obj.alive = false;
                std::mem::take(&mut obj.watchers)
            }
            _ => return,
        };
        state.pending.extend(tokens);
    }

    pub fn drain_weak_callbacks(&self) -> Vec<WeakCallbackToken> {
        std::mem::take(&mut self.state.borrow_mut().pending)
    }

    pub fn live_count(&self) -> usize {
        self.state
            .borrow()
            .objects
            .values()
            .filter(|o| o.alive)
            .count()
    }
}

impl Default for SimHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl SimString {
    pub fn is_alive(&self) -> bool {
        self.state
            .borrow()
            .objects
            .get(&self.id)
            .is_some_and(|o| o.alive)
    }
}

impl HostString for SimString {
    type Weak = SimWeak;

    fn identity(&self) -> WeakKey {
        let state = self.state.borrow();
        WeakKey::new(state.objects.get(&self.id).map_or(0, |o| o.addr))
    }

    fn len_utf16(&self) -> usize {
        let state = self.state.borrow();
        state
            .objects
            .get(&self.id)
            .map_or(0, |o| o.text.encode_utf16().count())
    }

    fn to_utf8(&self) -> String {
        let state = self.state.borrow();
        state
            .objects
            .get(&self.id)
            .map(|o| o.text.clone())
            .unwrap_or_default()
    }

    fn downgrade(&self, token: WeakCallbackToken) -> SimWeak {
        if let Some(obj) = self.state.borrow_mut().objects.get_mut(&self.id) {
            if obj.alive {
                obj.watchers.push(token);
            }
        }
        SimWeak {
            state: Rc::clone(&self.state),
            id: Some(self.id),
        }
    }
}

impl HostWeakRef for SimWeak {
    fn is_collected(&self) -> bool {
        match self.id {
            Some(id) => !self.state.borrow().objects.get(&id).is_some_and(|o| o.alive),
            None => true,
        }
    }

    fn current_identity(&self) -> WeakKey {
        let addr = self
            .id
            .and_then(|id| self.state.borrow().objects.get(&id).map(|o| o.addr))
            .unwrap_or(0);
        WeakKey::new(addr)
    }

    fn reset(&mut self) {
        self.id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::pool::FixedPool;
    use crate::engine_core::types::TransactionKey;

    fn token() -> WeakCallbackToken {
        let mut pool = FixedPool::new(1);
        WeakCallbackToken {
            transaction: TransactionKey::new(1),
            object: pool.pop(()).unwrap(),
        }
    }

    #[test]
    fn test_alloc_is_aligned_and_distinct() {
        let heap = SimHeap::new();
        let a = heap.alloc("hello world");
        let b = heap.alloc("x");
        assert_eq!(a.identity().addr() % ALIGNMENT, 0);
        assert_eq!(b.identity().addr() % ALIGNMENT, 0);
        assert_ne!(a.identity(), b.identity());
        assert_eq!(a.len_utf16(), 11);
    }

    #[test]
    fn test_utf16_length() {
        let heap = SimHeap::new();
        assert_eq!(heap.alloc("é😀").len_utf16(), 3);
    }

    #[test]
    fn test_relocate_visible_through_weak() {
        let heap = SimHeap::new();
        let s = heap.alloc_at(0x1000, "abc");
        let weak = s.downgrade(token());
        heap.relocate(&s, 0x2000);
        assert_eq!(weak.current_identity(), WeakKey::new(0x2000));
        assert_eq!(s.identity(), WeakKey::new(0x2000));
        assert!(!weak.is_collected());
    }

    #[test]
    fn test_collect_queues_callbacks_once() {
        let heap = SimHeap::new();
        let s = heap.alloc("abc");
        let mut weak = s.downgrade(token());
        heap.collect(&s);
        heap.collect(&s);
        assert!(weak.is_collected());
        assert_eq!(heap.drain_weak_callbacks().len(), 1);
        assert!(heap.drain_weak_callbacks().is_empty());
        assert_eq!(heap.live_count(), 0);

        weak.reset();
        assert!(weak.is_collected());
        assert_eq!(weak.current_identity(), WeakKey::new(0));
    }
}
