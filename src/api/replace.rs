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

//! `String.prototype.replace` with a string or a regular expression.
//!
//! Subject ranges before a match are kept, ranges overlapping a match are
//! split around it, the replacer's ranges are inserted at the match offset
//! and everything after is shifted by the accumulated length change.

use serde::{Deserialize, Serialize};

use crate::api::propagation::{attach, copy_ranges_with_offset, shift};
use crate::api::{settle, Propagation};
use crate::engine::manager::TransactionManager;
use crate::engine_core::errors::TaintError;
use crate::engine_core::traits::{HostString, HostWeakRef};
use crate::engine_core::types::TransactionKey;
use crate::tainted::range::SharedRanges;
use crate::tainted::transaction::Transaction;

/// One regex match in the subject, in UTF-16 units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceMatch {
    pub index: usize,
    pub matched_len: usize,
}

/// Single replacement of a `matcher_len` long match at `index`.
pub fn replace_string_by_string<S: HostString>(
    manager: &mut TransactionManager<S::Weak>,
    transaction: TransactionKey,
    result: &S,
    subject: &S,
    matcher_len: usize,
    replacer: &S,
    index: usize,
) -> Propagation {
    let Some(tx) = manager.get_mut(transaction) else {
        return Propagation::Untainted;
    };
    let subject_ranges = tx.ranges_of(subject.identity());
    let replacer_ranges = tx.ranges_of(replacer.identity());
    if subject_ranges.is_none() && replacer_ranges.is_none() {
        return Propagation::Untainted;
    }
    let matches = [ReplaceMatch {
        index,
        matched_len: matcher_len,
    }];
    settle(
        "replace_string_by_string",
        replace_ranges(
            tx,
            result,
            subject_ranges.as_ref(),
            replacer_ranges.as_ref(),
            replacer.len_utf16(),
            &matches,
        ),
    )
}

/// Every match of a global regex replaced by the same `replacer`. `matches`
/// must be in subject order and non-overlapping.
pub fn replace_string_by_string_using_regex<S: HostString>(
    manager: &mut TransactionManager<S::Weak>,
    transaction: TransactionKey,
    result: &S,
    subject: &S,
    replacer: &S,
    matches: &[ReplaceMatch],
) -> Propagation {
    let Some(tx) = manager.get_mut(transaction) else {
        return Propagation::Untainted;
    };
    let subject_ranges = tx.ranges_of(subject.identity());
    let replacer_ranges = tx.ranges_of(replacer.identity());
    if subject_ranges.is_none() && replacer_ranges.is_none() {
        return Propagation::Untainted;
    }
    settle(
        "replace_string_by_string_using_regex",
        replace_ranges(
            tx,
            result,
            subject_ranges.as_ref(),
            replacer_ranges.as_ref(),
            replacer.len_utf16(),
            matches,
        ),
    )
}

fn replace_ranges<S: HostString>(
    tx: &mut Transaction<S::Weak>,
    result: &S,
    subject: Option<&SharedRanges>,
    replacer: Option<&SharedRanges>,
    replacer_len: usize,
    matches: &[ReplaceMatch],
) -> Result<bool, TaintError> {
    let mut out: Option<SharedRanges> = None;
    let subject = subject.map(|r| tx.snapshot(r)).unwrap_or_default();

    let mut next = 0;
    let mut offset: isize = 0;
    let mut last_end = 0usize;
    for m in matches {
        // Subject ranges starting before this match.
        while let Some(&(handle, range)) = subject.get(next) {
            if range.start >= m.index {
                break;
            }
            let split = range.end > m.index;
            if last_end < range.end {
                let start = shift(range.start.max(last_end), offset);
                let end = shift(range.end.min(m.index), offset);
                let handle = if start == range.start && end == range.end {
                    handle
                } else {
                    tx.get_range(start, end, range.input_info, range.secure_marks)?
                };
                output(tx, &mut out)?.push_back(handle);
            }
            if split {
                break;
            }
            next += 1;
        }

        if let Some(replacer) = replacer.filter(|r| !r.is_empty()) {
            let at = shift(m.index, offset);
            let nothing_before = out.as_ref().map_or(true, |v| v.is_empty());
            let dest = output(tx, &mut out)?;
            if at == 0 && nothing_before {
                dest.add(replacer);
            } else {
                copy_ranges_with_offset(tx, replacer, &dest, at)?;
            }
        }

        last_end = m.index + m.matched_len;
        offset += replacer_len as isize - m.matched_len as isize;
    }

    // Remaining subject ranges, minus any part swallowed by the last match.
    for &(handle, range) in subject.get(next..).unwrap_or_default() {
        if range.end <= last_end {
            continue;
        }
        let handle = if range.start < last_end {
            tx.get_range(
                shift(last_end, offset),
                shift(range.end, offset),
                range.input_info,
                range.secure_marks,
            )?
        } else if offset == 0 {
            handle
        } else {
            tx.get_range(
                shift(range.start, offset),
                shift(range.end, offset),
                range.input_info,
                range.secure_marks,
            )?
        };
        output(tx, &mut out)?.push_back(handle);
    }

    match out {
        Some(out) => attach(tx, result, out),
        None => Ok(false),
    }
}

/// The result vector, pooled on first use.
fn output<R: HostWeakRef>(
    tx: &mut Transaction<R>,
    out: &mut Option<SharedRanges>,
) -> Result<SharedRanges, TaintError> {
    if let Some(vector) = out {
        return Ok(vector.clone());
    }
    let vector = tx.get_shared_vector_range()?;
    *out = Some(vector.clone());
    Ok(vector)
}
