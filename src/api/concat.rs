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

use crate::api::propagation::copy_ranges_with_offset;
use crate::api::{settle, Propagation};
use crate::engine::manager::TransactionManager;
use crate::engine_core::errors::TaintError;
use crate::engine_core::traits::HostString;
use crate::engine_core::types::TransactionKey;
use crate::tainted::range::SharedRanges;
use crate::tainted::transaction::Transaction;

/// `result = parts[0] + parts[1] + ...`
///
/// When only the first part is tainted the result shares its range vector.
/// Once the first part already holds the per-object range maximum, the other
/// parts are not merged in.
pub fn concat<S: HostString>(
    manager: &mut TransactionManager<S::Weak>,
    transaction: TransactionKey,
    result: &S,
    parts: &[&S],
) -> Propagation {
    let Some(tx) = manager.get_mut(transaction) else {
        return Propagation::Untainted;
    };
    settle("concat", concat_ranges(tx, result, parts))
}

fn concat_ranges<S: HostString>(
    tx: &mut Transaction<S::Weak>,
    result: &S,
    parts: &[&S],
) -> Result<bool, TaintError> {
    let Some((first, rest)) = parts.split_first() else {
        return Ok(false);
    };

    let mut ranges = tx.ranges_of(first.identity());
    let mut borrowed_first = ranges.is_some();
    let max_ranges = tx.limits().max_ranges_per_object();

    if ranges.as_ref().map_or(true, |r| r.len() < max_ranges) {
        let mut offset = first.len_utf16();
        for part in rest {
            if let Some(part_ranges) = tx.ranges_of(part.identity()) {
                let target: SharedRanges = match ranges.take() {
                    None => tx.get_shared_vector_range()?,
                    Some(first_ranges) if borrowed_first => {
                        borrowed_first = false;
                        let own = tx.get_shared_vector_range()?;
                        own.add(&first_ranges);
                        own
                    }
                    Some(own) => own,
                };
                copy_ranges_with_offset(tx, &part_ranges, &target, offset)?;
                ranges = Some(target);
            }
            offset += part.len_utf16();
        }
    }

    match ranges {
        Some(ranges) => {
            tx.add_tainted(result.identity(), ranges, result)?;
            Ok(true)
        }
        None => Ok(false),
    }
}
