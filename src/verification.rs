// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

//! Formal Verification Module (Kani Proofs)
//!
//! Capacities are kept tiny so CBMC unwinds every loop. Keys and sizes come
//! from `kani::any()` for exhaustive coverage within those bounds.

#[cfg(kani)]
mod proofs {
    use crate::config::Limits;
    use crate::container::pool::FixedPool;
    use crate::container::weak_map::WeakMap;
    use crate::engine_core::types::WeakKey;

    // =========================================================================
    // PROOF 1: BUCKET INDEX IN BOUNDS (weak_map.rs bucket_index)
    // =========================================================================
    #[kani::proof]
    fn prove_bucket_index_in_bounds() {
        let shift: u32 = kani::any();
        kani::assume(shift <= 3);
        let capacity = 1usize << shift;
        let Ok(map) = WeakMap::new(capacity) else {
            kani::assert(false, "Power-of-two capacity must be accepted");
            return;
        };
        let addr: usize = kani::any();
        kani::assert(
            map.bucket_index(WeakKey::new(addr)) < capacity,
            "CRITICAL: Bucket index must stay inside the table",
        );
    }

    // =========================================================================
    // PROOF 2: NON-POWER-OF-TWO CAPACITY REJECTED
    // =========================================================================
    #[kani::proof]
    fn prove_bad_capacity_rejected() {
        let capacity: usize = kani::any();
        kani::assume(capacity <= 16);
        kani::assume(capacity == 0 || !capacity.is_power_of_two());
        kani::assert(WeakMap::new(capacity).is_err(), "Capacity must be a power of two");
    }

    // =========================================================================
    // PROOF 3: POOL ACCOUNTING (pool.rs pop/push)
    // =========================================================================
    #[kani::proof]
    #[kani::unwind(4)]
    fn prove_pool_accounting() {
        let mut pool: FixedPool<u8> = FixedPool::new(2);
        let a = pool.pop(1);
        let b = pool.pop(2);
        kani::assert(a.is_ok() && b.is_ok(), "Pool must serve up to capacity");
        kani::assert(pool.pop(3).is_err(), "CRITICAL: Pool must refuse past capacity");

        if let Ok(a) = a {
            let release_twice: bool = kani::any();
            pool.push(a);
            if release_twice {
                kani::assert(pool.push(a).is_none(), "Double release must be a no-op");
            }
        }
        kani::assert(
            pool.len() + pool.available() == pool.capacity(),
            "CRITICAL: Live plus free must equal capacity",
        );
    }

    // =========================================================================
    // PROOF 4: STALE HANDLE REJECTED AFTER REUSE
    // =========================================================================
    #[kani::proof]
    #[kani::unwind(3)]
    fn prove_stale_handle_rejected() {
        let mut pool: FixedPool<u8> = FixedPool::new(1);
        if let Ok(old) = pool.pop(1) {
            pool.push(old);
            if let Ok(new) = pool.pop(2) {
                kani::assert(old.index() == new.index(), "Single slot is reused");
                kani::assert(pool.get(old).is_none(), "CRITICAL: Stale handle must not resolve");
                kani::assert(pool.get(new) == Some(&2), "Fresh handle resolves");
            }
        }
    }

    // =========================================================================
    // PROOF 5: RANGE POOL SIZE FITS 32 BITS (config.rs Limits::new)
    // =========================================================================
    #[kani::proof]
    fn prove_limits_no_overflow() {
        let objects: usize = kani::any();
        let ranges: usize = kani::any();
        if let Ok(limits) = Limits::new(objects, ranges) {
            kani::assert(
                limits.max_global_ranges() <= u32::MAX as usize,
                "CRITICAL: Range pool size must fit u32",
            );
            kani::assert(
                limits.max_global_ranges() == objects * ranges,
                "Range pool is objects x ranges",
            );
        }
    }
}
