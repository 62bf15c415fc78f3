// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lilith_iast::api;
use lilith_iast::config::Limits;
use lilith_iast::engine::TransactionManager;
use lilith_iast::engine_core::traits::HostString;
use lilith_iast::engine_core::types::TransactionKey;
use lilith_iast::host::sim::{SimHeap, SimString, SimWeak};

#[derive(Debug, Arbitrary)]
enum Op {
    Source(u8),
    Concat(u8, u8),
    Slice(u8, i8, Option<i8>),
    Trim(u8),
    Replace(u8, u8, u8, u8),
}

fuzz_target!(|input: (String, Vec<Op>)| {
    // Propagation must never panic and never emit a range outside the
    // result it is attached to, whatever the pools have left.
    let (seed, ops) = input;
    let heap = SimHeap::new();
    let mut m: TransactionManager<SimWeak> = TransactionManager::new(Limits::new(8, 4).unwrap(), 1);
    let tx = TransactionKey::new(1);
    let mut strings: Vec<SimString> = vec![heap.alloc(&seed)];

    for op in ops {
        let pick = |i: u8| strings[i as usize % strings.len()].clone();
        let produced = match op {
            Op::Source(i) => {
                let s = pick(i);
                api::new_tainted_string(&mut m, tx, &s, "p", "t");
                None
            }
            Op::Concat(a, b) => {
                let (a, b) = (pick(a), pick(b));
                let r = heap.alloc(&(a.to_utf8() + &b.to_utf8()));
                api::concat(&mut m, tx, &r, &[&a, &b]);
                Some(r)
            }
            Op::Slice(i, start, end) => {
                let s = pick(i);
                let units: Vec<u16> = s.to_utf8().encode_utf16().collect();
                let len = units.len() as i64;
                let norm = |x: i64| if x < 0 { (len + x).max(0) } else { x.min(len) };
                let (from, to) = (norm(start as i64), end.map_or(len, |e| norm(e as i64)));
                let cut = if from < to {
                    String::from_utf16_lossy(&units[from as usize..to as usize])
                } else {
                    String::new()
                };
                let r = heap.alloc(&cut);
                api::slice(&mut m, tx, &r, &s, start as i64, end.map(i64::from));
                Some(r)
            }
            Op::Trim(i) => {
                let s = pick(i);
                let r = heap.alloc(s.to_utf8().trim());
                api::trim(&mut m, tx, &r, &s);
                Some(r)
            }
            Op::Replace(i, r, at, len) => {
                let (s, rep) = (pick(i), pick(r));
                let index = at as usize % (s.len_utf16() + 1);
                let matched = (len as usize).min(s.len_utf16() - index);
                let out_len = s.len_utf16() - matched + rep.len_utf16();
                let out = heap.alloc(&"x".repeat(out_len));
                api::replace_string_by_string(&mut m, tx, &out, &s, matched, &rep, index);
                Some(out)
            }
        };
        if let Some(r) = produced {
            if let Some(ranges) = api::get_ranges(&m, tx, &r) {
                for range in ranges {
                    assert!(range.start <= range.end && range.end <= r.len_utf16());
                }
            }
            strings.push(r);
        }
    }
});
