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

use crate::api::propagation::{attach, copy_ranges_with_offset};
use crate::api::{settle, Propagation};
use crate::engine::manager::TransactionManager;
use crate::engine_core::constants::propagation::DEFAULT_JOIN_SEPARATOR_LENGTH;
use crate::engine_core::errors::TaintError;
use crate::engine_core::traits::HostString;
use crate::engine_core::types::TransactionKey;
use crate::tainted::range::SharedRanges;
use crate::tainted::transaction::Transaction;

/// `result = items.join(separator)`. A missing separator is the default
/// `","`.
pub fn array_join<S: HostString>(
    manager: &mut TransactionManager<S::Weak>,
    transaction: TransactionKey,
    result: &S,
    items: &[&S],
    separator: Option<&S>,
) -> Propagation {
    let Some(tx) = manager.get_mut(transaction) else {
        return Propagation::Untainted;
    };
    settle("array_join", join_ranges(tx, result, items, separator))
}

fn join_ranges<S: HostString>(
    tx: &mut Transaction<S::Weak>,
    result: &S,
    items: &[&S],
    separator: Option<&S>,
) -> Result<bool, TaintError> {
    let separator_len = separator.map_or(DEFAULT_JOIN_SEPARATOR_LENGTH, |s| s.len_utf16());
    let separator_ranges = separator.and_then(|s| tx.ranges_of(s.identity()));
    let item_ranges: Vec<Option<SharedRanges>> =
        items.iter().map(|i| tx.ranges_of(i.identity())).collect();

    let separator_counts = separator_ranges.is_some() && items.len() > 1;
    if !separator_counts && item_ranges.iter().all(Option::is_none) {
        return Ok(false);
    }

    let out = tx.get_shared_vector_range()?;
    let mut offset = 0;
    for (n, (item, ranges)) in items.iter().zip(&item_ranges).enumerate() {
        if n > 0 {
            if let Some(separator_ranges) = &separator_ranges {
                copy_ranges_with_offset(tx, separator_ranges, &out, offset)?;
            }
            offset += separator_len;
        }
        if let Some(ranges) = ranges {
            copy_ranges_with_offset(tx, ranges, &out, offset)?;
        }
        offset += item.len_utf16();
    }
    attach(tx, result, out)
}
