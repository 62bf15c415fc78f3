use std::io::Write;

use lilith_iast::api::{self, Propagation};
use lilith_iast::config::Config;
use lilith_iast::engine::{GcEpoch, IastContext};
use lilith_iast::engine_core::errors::TaintError;
use lilith_iast::engine_core::traits::HostString;
use lilith_iast::engine_core::types::{TransactionKey, WeakKey};
use lilith_iast::host::sim::{SimHeap, SimWeak};

fn context() -> IastContext<SimWeak> {
    IastContext::init(Config {
        max_transactions: 2,
        max_tainted_objects: 32,
        max_ranges_per_object: 4,
        ..Config::default()
    })
    .unwrap()
}

#[test]
fn test_request_lifecycle_with_backpressure() {
    let heap = SimHeap::new();
    let mut ctx = context();
    let (r1, r2, r3) = (
        TransactionKey::new(1),
        TransactionKey::new(2),
        TransactionKey::new(3),
    );
    let a = heap.alloc("a");
    let b = heap.alloc("b");
    let c = heap.alloc("c");

    let m = ctx.manager_mut();
    assert!(api::new_tainted_string(m, r1, &a, "p", "t").is_tainted());
    assert!(api::new_tainted_string(m, r2, &b, "p", "t").is_tainted());
    assert_eq!(
        api::new_tainted_string(m, r3, &c, "p", "t"),
        Propagation::Degraded(TaintError::TransactionLimit { max: 2 })
    );
    assert!(!api::is_tainted(m, r3, &[&c]));

    assert!(api::remove_transaction(m, r1));
    assert!(!api::is_tainted(m, r1, &[&a]));
    assert!(api::new_tainted_string(m, r3, &c, "p", "t").is_tainted());
    // r3 reuses r1's instance.
    assert_eq!(m.instances(), 2);
    assert_eq!(m.size(), 2);

    api::set_max_transactions(m, 3);
    assert!(api::new_tainted_string(m, r1, &a, "p", "t").is_tainted());
    assert_eq!(m.size(), 3);

    ctx.shutdown();
}

#[test]
fn test_collected_strings_are_evicted_at_epilogue() {
    let heap = SimHeap::new();
    let mut ctx = context();
    let tx = TransactionKey::new(7);
    let kept = heap.alloc("kept");
    let gone = heap.alloc("gone");
    api::new_tainted_string(ctx.manager_mut(), tx, &kept, "k", "t");
    api::new_tainted_string(ctx.manager_mut(), tx, &gone, "g", "t");

    heap.collect(&gone);
    let delivered = heap
        .drain_weak_callbacks()
        .into_iter()
        .filter(|token| ctx.on_weak_collected(*token))
        .count();
    assert_eq!(delivered, 1);

    // Collected but not yet evicted: lookups already miss it.
    let t = ctx.manager().get(tx).unwrap();
    assert!(t.find_tainted_object(gone.identity()).is_none());
    assert_eq!(t.map_len(), 2);

    let stats = ctx.on_gc_epilogue(GcEpoch::Scavenge);
    assert_eq!(stats.evicted, 1);
    let t = ctx.manager().get(tx).unwrap();
    assert_eq!(t.map_len(), 1);
    assert!(api::is_tainted(ctx.manager(), tx, &[&kept]));
}

#[test]
fn test_moved_strings_follow_the_collector() {
    let heap = SimHeap::new();
    let mut ctx = context();
    let tx = TransactionKey::new(7);
    let s = heap.alloc_at(0x1000, "hello");
    api::new_tainted_string(ctx.manager_mut(), tx, &s, "user.name", "t");

    heap.relocate(&s, 0x2000);
    assert_eq!(s.identity(), WeakKey::new(0x2000));
    assert!(!api::is_tainted(ctx.manager(), tx, &[&s]));

    assert_eq!(ctx.on_gc_epilogue(GcEpoch::MarkSweepCompact).moved, 1);
    let ranges = api::get_ranges(ctx.manager(), tx, &s).unwrap();
    assert_eq!((ranges[0].start, ranges[0].end), (0, 5));
    assert_eq!(ranges[0].iinfo.parameter_name, "user.name");
}

#[test]
fn test_late_callbacks_after_request_end() {
    let heap = SimHeap::new();
    let mut ctx = context();
    let tx = TransactionKey::new(7);
    let s = heap.alloc("x");
    api::new_tainted_string(ctx.manager_mut(), tx, &s, "p", "t");
    api::remove_transaction(ctx.manager_mut(), tx);

    // Same key, new request, new string in the recycled slot.
    let fresh = heap.alloc("y");
    api::new_tainted_string(ctx.manager_mut(), tx, &fresh, "p", "t");

    heap.collect(&s);
    for token in heap.drain_weak_callbacks() {
        assert!(!ctx.on_weak_collected(token));
    }
    assert_eq!(ctx.on_gc_epilogue(GcEpoch::Scavenge).evicted, 0);
    assert!(api::is_tainted(ctx.manager(), tx, &[&fresh]));
}

#[test]
fn test_derived_strings_outlive_their_source() {
    let heap = SimHeap::new();
    let mut ctx = context();
    let tx = TransactionKey::new(7);
    let src = heap.alloc("hello");
    api::new_tainted_string(ctx.manager_mut(), tx, &src, "q", "t");
    let upper = heap.alloc("HELLO");
    assert!(api::string_case(ctx.manager_mut(), tx, &upper, &src).is_tainted());

    heap.collect(&src);
    for token in heap.drain_weak_callbacks() {
        ctx.on_weak_collected(token);
    }
    ctx.on_gc_epilogue(GcEpoch::Scavenge);

    // The shared range vector is still referenced by the survivor.
    let t = ctx.manager().get(tx).unwrap();
    assert_eq!(t.vectors_in_use(), 1);
    assert_eq!(api::get_ranges(ctx.manager(), tx, &upper).unwrap().len(), 1);
}

#[test]
fn test_context_from_yaml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "max_transactions: 1\nmax_tainted_objects: 8\nmax_ranges_per_object: 2"
    )
    .unwrap();
    let config = Config::from_yaml_file(file.path()).unwrap();
    let mut ctx: IastContext<SimWeak> = IastContext::init(config).unwrap();

    let limits = *ctx.manager().limits();
    assert_eq!(limits.max_global_ranges(), 16);
    ctx.manager_mut().new_transaction(TransactionKey::new(1)).unwrap();
    assert!(ctx
        .manager_mut()
        .new_transaction(TransactionKey::new(2))
        .is_err());
}

#[test]
fn test_context_rejects_bad_yaml_limits() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_tainted_objects: 12").unwrap();
    let config = Config::from_yaml_file(file.path()).unwrap();
    let err = IastContext::<SimWeak>::init(config).unwrap_err();
    assert_eq!(err.kind(), "configuration");
}
