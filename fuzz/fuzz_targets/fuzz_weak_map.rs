// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lilith_iast::container::{FixedPool, PoolHandle, WeakMap};
use lilith_iast::engine_core::traits::{WeakLink, WeakObject};
use lilith_iast::engine_core::types::WeakKey;

struct Entry {
    addr: Option<usize>,
    link: WeakLink,
}

impl WeakObject for Entry {
    fn is_empty(&self) -> bool {
        self.addr.is_none()
    }

    fn current_key(&self) -> WeakKey {
        WeakKey::new(self.addr.unwrap_or(0))
    }

    fn link(&self) -> &WeakLink {
        &self.link
    }

    fn link_mut(&mut self) -> &mut WeakLink {
        &mut self.link
    }
}

#[derive(Debug, Arbitrary)]
enum Op {
    Insert(u16),
    Find(u16),
    Del(u16),
    Move(u8, u16),
    Collect(u8),
    Rehash,
    Clean,
}

fuzz_target!(|ops: Vec<Op>| {
    // Any sequence of map operations must keep the entry count consistent
    // with the pool and never panic.
    let mut pool: FixedPool<Entry> = FixedPool::new(16);
    let mut map = WeakMap::new(16).unwrap();
    let mut handles: Vec<PoolHandle> = Vec::new();

    for op in ops {
        match op {
            Op::Insert(addr) => {
                let addr = addr as usize;
                if let Ok(h) = pool.pop(Entry { addr: Some(addr), link: WeakLink::default() }) {
                    if map.insert(&mut pool, WeakKey::new(addr), h).is_ok() {
                        handles.push(h);
                    } else {
                        pool.push(h);
                    }
                }
            }
            Op::Find(addr) => {
                if let Some(h) = map.find(&pool, WeakKey::new(addr as usize)) {
                    assert!(pool.contains(h));
                }
            }
            Op::Del(addr) => {
                let _ = map.del(&mut pool, WeakKey::new(addr as usize));
            }
            Op::Move(i, addr) => {
                if let Some(h) = handles.get(i as usize % handles.len().max(1)) {
                    if let Some(e) = pool.get_mut(*h) {
                        if e.addr.is_some() {
                            e.addr = Some(addr as usize);
                        }
                    }
                }
            }
            Op::Collect(i) => {
                if let Some(h) = handles.get(i as usize % handles.len().max(1)) {
                    if let Some(e) = pool.get_mut(*h) {
                        e.addr = None;
                    }
                }
            }
            Op::Rehash => {
                map.rehash(&mut pool);
                // Every surviving entry is reachable under its live key.
                for (_, entry) in pool.iter() {
                    assert!(!entry.is_empty());
                    let found = map.find(&pool, entry.current_key());
                    assert!(found.is_some(), "live entry lost by rehash");
                }
            }
            Op::Clean => {
                map.clean();
                pool.clear();
                handles.clear();
            }
        }
        assert_eq!(map.len(), pool.len());
    }
});
