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

//! Range arithmetic shared by the propagation operations.

use crate::api::{settle, Propagation};
use crate::engine::manager::TransactionManager;
use crate::engine_core::errors::TaintError;
use crate::engine_core::traits::{HostString, HostWeakRef};
use crate::engine_core::types::TransactionKey;
use crate::tainted::range::SharedRanges;
use crate::tainted::transaction::Transaction;

/// `pos + delta`, floored at zero.
pub(crate) fn shift(pos: usize, delta: isize) -> usize {
    pos.saturating_add_signed(delta)
}

/// Append every range of `source` to `dest`, moved right by `offset`.
/// Unmoved ranges are shared rather than copied.
pub(crate) fn copy_ranges_with_offset<R: HostWeakRef>(
    tx: &mut Transaction<R>,
    source: &SharedRanges,
    dest: &SharedRanges,
    offset: usize,
) -> Result<(), TaintError> {
    for (handle, range) in tx.snapshot(source) {
        let handle = if offset == 0 {
            handle
        } else {
            tx.get_range(
                range.start + offset,
                range.end + offset,
                range.input_info,
                range.secure_marks,
            )?
        };
        dest.push_back(handle);
    }
    Ok(())
}

/// Ranges of `source` inside `[start, end)`, rebased to `start` and clipped
/// to `result_len`. `None` when nothing overlaps.
pub(crate) fn ranges_in_window<R: HostWeakRef>(
    tx: &mut Transaction<R>,
    source: &SharedRanges,
    start: usize,
    end: usize,
    result_len: usize,
) -> Result<Option<SharedRanges>, TaintError> {
    let mut out: Option<SharedRanges> = None;
    for (handle, range) in tx.snapshot(source) {
        if range.end <= start {
            continue;
        }
        if range.start >= end {
            break;
        }
        let new_start = range.start.max(start) - start;
        let new_end = (range.end.min(end) - start).min(result_len);
        if new_end <= new_start {
            continue;
        }
        let handle = if new_start == range.start && new_end == range.end {
            handle
        } else {
            tx.get_range(new_start, new_end, range.input_info, range.secure_marks)?
        };
        if out.is_none() {
            out = Some(tx.get_shared_vector_range()?);
        }
        if let Some(ranges) = &out {
            ranges.push_back(handle);
        }
    }
    Ok(out)
}

/// Bind `ranges` to `result` unless empty.
pub(crate) fn attach<S: HostString>(
    tx: &mut Transaction<S::Weak>,
    result: &S,
    ranges: SharedRanges,
) -> Result<bool, TaintError> {
    if ranges.is_empty() {
        return Ok(false);
    }
    tx.add_tainted(result.identity(), ranges, result)?;
    Ok(true)
}

/// Taint `result` with the part of `subject` it was cut from.
pub(crate) fn propagate_window<S: HostString>(
    operation: &'static str,
    manager: &mut TransactionManager<S::Weak>,
    transaction: TransactionKey,
    result: &S,
    subject: &S,
    start: usize,
    end: usize,
) -> Propagation {
    let Some(tx) = manager.get_mut(transaction) else {
        return Propagation::Untainted;
    };
    let Some(source) = tx.ranges_of(subject.identity()) else {
        return Propagation::Untainted;
    };
    settle(operation, window_into(tx, &source, start, end, result))
}

fn window_into<S: HostString>(
    tx: &mut Transaction<S::Weak>,
    source: &SharedRanges,
    start: usize,
    end: usize,
    result: &S,
) -> Result<bool, TaintError> {
    match ranges_in_window(tx, source, start, end, result.len_utf16())? {
        Some(ranges) => attach(tx, result, ranges),
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Limits;
    use crate::host::sim::SimWeak;

    fn tx_with(spans: &[(usize, usize)]) -> (Transaction<SimWeak>, SharedRanges) {
        let mut tx =
            Transaction::new(TransactionKey::new(1), 0, Limits::new(16, 8).unwrap()).unwrap();
        let info = tx.create_new_input_info("p", "v", "t").unwrap();
        let v = tx.get_shared_vector_range().unwrap();
        for (s, e) in spans {
            v.push_back(tx.get_range(*s, *e, info, 0).unwrap());
        }
        (tx, v)
    }

    fn spans(tx: &Transaction<SimWeak>, v: &SharedRanges) -> Vec<(usize, usize)> {
        tx.snapshot(v).iter().map(|(_, r)| (r.start, r.end)).collect()
    }

    #[test]
    fn test_window_cases() {
        // left-out, partial left, contained, partial right, right-out
        let (mut tx, v) = tx_with(&[(0, 2), (3, 6), (7, 9), (10, 14), (20, 25)]);
        let out = ranges_in_window(&mut tx, &v, 4, 12, 8).unwrap().unwrap();
        assert_eq!(spans(&tx, &out), vec![(0, 2), (3, 5), (6, 8)]);
    }

    #[test]
    fn test_window_range_covers_slice() {
        let (mut tx, v) = tx_with(&[(0, 10)]);
        let out = ranges_in_window(&mut tx, &v, 2, 5, 3).unwrap().unwrap();
        assert_eq!(spans(&tx, &out), vec![(0, 3)]);
    }

    #[test]
    fn test_window_without_overlap() {
        let (mut tx, v) = tx_with(&[(0, 2)]);
        assert!(ranges_in_window(&mut tx, &v, 2, 4, 2).unwrap().is_none());
        assert_eq!(tx.vectors_in_use(), 1);
    }

    #[test]
    fn test_unshifted_ranges_are_shared() {
        let (mut tx, v) = tx_with(&[(0, 2)]);
        let before = tx.range_count();
        let dest = tx.get_shared_vector_range().unwrap();
        copy_ranges_with_offset(&mut tx, &v, &dest, 0).unwrap();
        assert_eq!(tx.range_count(), before);
        copy_ranges_with_offset(&mut tx, &v, &dest, 5).unwrap();
        assert_eq!(spans(&tx, &dest), vec![(0, 2), (5, 7)]);
    }

    #[test]
    fn test_shift_floors_at_zero() {
        assert_eq!(shift(5, -2), 3);
        assert_eq!(shift(1, -4), 0);
        assert_eq!(shift(1, 4), 5);
    }
}
