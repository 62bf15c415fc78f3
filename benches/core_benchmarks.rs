use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lilith_iast::api;
use lilith_iast::config::Limits;
use lilith_iast::container::{FixedPool, WeakMap};
use lilith_iast::engine::gc::{on_gc_epilogue, GcEpoch};
use lilith_iast::engine::TransactionManager;
use lilith_iast::engine_core::traits::{WeakLink, WeakObject};
use lilith_iast::engine_core::types::{TransactionKey, WeakKey};
use lilith_iast::host::sim::{SimHeap, SimWeak};

struct Entry {
    addr: usize,
    link: WeakLink,
}

impl WeakObject for Entry {
    fn is_empty(&self) -> bool {
        false
    }

    fn current_key(&self) -> WeakKey {
        WeakKey::new(self.addr)
    }

    fn link(&self) -> &WeakLink {
        &self.link
    }

    fn link_mut(&mut self) -> &mut WeakLink {
        &mut self.link
    }
}

fn bench_pool_cycle(c: &mut Criterion) {
    let mut pool: FixedPool<u64> = FixedPool::new(4096);

    c.bench_function("pool_pop_push", |b| {
        b.iter(|| {
            if let Ok(h) = pool.pop(black_box(7)) {
                pool.push(h);
            }
        })
    });
}

fn bench_weak_map_insert(c: &mut Criterion) {
    let mut pool = FixedPool::new(1024);
    let mut map = WeakMap::new(1024).unwrap();
    for i in 0..1023usize {
        let addr = 0x10000 + i * 8;
        let h = pool.pop(Entry { addr, link: WeakLink::default() }).unwrap();
        map.insert(&mut pool, WeakKey::new(addr), h).unwrap();
    }

    c.bench_function("weak_map_insert_del_near_full", |b| {
        b.iter(|| {
            let key = black_box(WeakKey::new(0x8));
            if let Ok(h) = pool.pop(Entry { addr: 0x8, link: WeakLink::default() }) {
                if map.insert(&mut pool, key, h).is_ok() {
                    map.del(&mut pool, key);
                }
            }
        })
    });
}

fn bench_weak_map_find(c: &mut Criterion) {
    let mut pool = FixedPool::new(4096);
    let mut map = WeakMap::new(4096).unwrap();
    for i in 0..4096usize {
        let addr = 0x10000 + i * 24;
        let h = pool.pop(Entry { addr, link: WeakLink::default() }).unwrap();
        map.insert(&mut pool, WeakKey::new(addr), h).unwrap();
    }

    c.bench_function("weak_map_find_full", |b| {
        b.iter(|| map.find(&pool, black_box(WeakKey::new(0x10000 + 2048 * 24))))
    });
}

fn bench_concat_propagation(c: &mut Criterion) {
    let heap = SimHeap::new();
    let mut manager: TransactionManager<SimWeak> = TransactionManager::new(Limits::default(), 2);
    let tx = TransactionKey::new(1);
    let user = heap.alloc("alice");
    api::new_tainted_string(&mut manager, tx, &user, "user.name", "http.request.parameter");
    let prefix = heap.alloc("SELECT * FROM users WHERE name = '");

    c.bench_function("concat_then_request_end", |b| {
        b.iter(|| {
            let result = heap.alloc("SELECT * FROM users WHERE name = 'alice");
            let _ = api::concat(&mut manager, tx, &result, &[&prefix, &user]);
            manager.remove(tx);
            api::new_tainted_string(&mut manager, tx, &user, "user.name", "http.request.parameter");
        })
    });
}

fn bench_gc_epilogue(c: &mut Criterion) {
    let heap = SimHeap::new();
    let mut manager: TransactionManager<SimWeak> =
        TransactionManager::new(Limits::new(1024, 4).unwrap(), 2);
    let tx = TransactionKey::new(1);
    for i in 0..512 {
        let s = heap.alloc(&format!("value-{}", i));
        api::new_tainted_string(&mut manager, tx, &s, "p", "t");
    }

    c.bench_function("gc_epilogue_512_live", |b| {
        b.iter(|| on_gc_epilogue(&mut manager, black_box(GcEpoch::Scavenge)))
    });
}

criterion_group!(
    benches,
    bench_pool_cycle,
    bench_weak_map_insert,
    bench_weak_map_find,
    bench_concat_propagation,
    bench_gc_epilogue
);
criterion_main!(benches);
