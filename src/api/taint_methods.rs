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

//! Taint sources and queries.

use serde::Serialize;

use crate::api::{settle, Propagation};
use crate::engine::manager::TransactionManager;
use crate::engine_core::errors::TaintError;
use crate::engine_core::traits::{HostString, HostWeakRef};
use crate::engine_core::types::TransactionKey;
use crate::tainted::input_info::InputInfo;
use crate::tainted::range::{SecureMarks, SharedRanges};
use crate::tainted::transaction::Transaction;

/// Serialisable view of one range, as handed back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct RangeView {
    pub start: usize,
    pub end: usize,
    pub iinfo: InputInfo,
    pub secure_marks: SecureMarks,
}

/// Mark a request parameter as untrusted. Opens the request's transaction
/// on first use. Empty strings carry nothing and are skipped.
pub fn new_tainted_string<S: HostString>(
    manager: &mut TransactionManager<S::Weak>,
    transaction: TransactionKey,
    value: &S,
    parameter_name: &str,
    origin_type: &str,
) -> Propagation {
    if value.len_utf16() == 0 {
        return Propagation::Untainted;
    }
    settle(
        "new_tainted_string",
        taint_whole_value(manager, transaction, value, parameter_name, origin_type),
    )
}

/// Same as [`new_tainted_string`] for non-string values with an identity,
/// tainted over the length of their textual form.
pub fn new_tainted_object<S: HostString>(
    manager: &mut TransactionManager<S::Weak>,
    transaction: TransactionKey,
    value: &S,
    parameter_name: &str,
    origin_type: &str,
) -> Propagation {
    settle(
        "new_tainted_object",
        taint_whole_value(manager, transaction, value, parameter_name, origin_type),
    )
}

fn taint_whole_value<S: HostString>(
    manager: &mut TransactionManager<S::Weak>,
    transaction: TransactionKey,
    value: &S,
    parameter_name: &str,
    origin_type: &str,
) -> Result<bool, TaintError> {
    let tx = manager.new_transaction(transaction)?;
    let key = value.identity();
    if tx.find_tainted_object(key).is_some() {
        return Ok(true);
    }
    let info = tx.create_new_input_info(parameter_name, &value.to_utf8(), origin_type)?;
    let range = tx.get_range(0, value.len_utf16(), info, 0)?;
    let ranges = tx.get_shared_vector_range()?;
    ranges.push_back(range);
    tx.add_tainted(key, ranges, value)?;
    Ok(true)
}

/// OR `marks` into the ranges of `value`. With a `result`, the marked copy
/// is bound to `result` and `value` keeps its ranges; without one the
/// shared ranges are marked in place.
pub fn add_secure_marks<S: HostString>(
    manager: &mut TransactionManager<S::Weak>,
    transaction: TransactionKey,
    value: &S,
    marks: SecureMarks,
    result: Option<&S>,
) -> Propagation {
    let Some(tx) = manager.get_mut(transaction) else {
        return Propagation::Untainted;
    };
    let Some(source) = tx.ranges_of(value.identity()) else {
        return Propagation::Untainted;
    };
    if marks == 0 {
        return Propagation::Tainted;
    }

    match result {
        Some(result) => settle("add_secure_marks", marked_copy(tx, &source, marks, result)),
        None => settle("add_secure_marks", mark_in_place(tx, &source, marks)),
    }
}

fn mark_in_place<R: HostWeakRef>(
    tx: &mut Transaction<R>,
    source: &SharedRanges,
    marks: SecureMarks,
) -> Result<bool, TaintError> {
    for (handle, _) in tx.snapshot(source) {
        tx.add_secure_marks(handle, marks)?;
    }
    Ok(true)
}

fn marked_copy<S: HostString>(
    tx: &mut Transaction<S::Weak>,
    source: &SharedRanges,
    marks: SecureMarks,
    result: &S,
) -> Result<bool, TaintError> {
    let marked = tx.get_shared_vector_range()?;
    for (_, range) in tx.snapshot(source) {
        marked.push_back(tx.get_range(
            range.start,
            range.end,
            range.input_info,
            range.secure_marks | marks,
        )?);
    }
    tx.add_tainted(result.identity(), marked, result)?;
    Ok(true)
}

/// True if any of `values` is tracked in the request.
pub fn is_tainted<S: HostString>(
    manager: &TransactionManager<S::Weak>,
    transaction: TransactionKey,
    values: &[&S],
) -> bool {
    let Some(tx) = manager.get(transaction) else {
        return false;
    };
    values
        .iter()
        .any(|v| tx.ranges_of(v.identity()).is_some())
}

pub fn get_ranges<S: HostString>(
    manager: &TransactionManager<S::Weak>,
    transaction: TransactionKey,
    value: &S,
) -> Option<Vec<RangeView>> {
    let tx = manager.get(transaction)?;
    let ranges = tx.ranges_of(value.identity())?;
    let views = tx
        .snapshot(&ranges)
        .into_iter()
        .filter_map(|(_, range)| {
            tx.input_info(range.input_info).map(|info| RangeView {
                start: range.start,
                end: range.end,
                iinfo: info.clone(),
                secure_marks: range.secure_marks,
            })
        })
        .collect();
    Some(views)
}

/// End of request.
pub fn remove_transaction<R: HostWeakRef>(
    manager: &mut TransactionManager<R>,
    transaction: TransactionKey,
) -> bool {
    manager.remove(transaction)
}

pub fn set_max_transactions<R: HostWeakRef>(
    manager: &mut TransactionManager<R>,
    max: usize,
) {
    manager.set_max_items(max);
}
