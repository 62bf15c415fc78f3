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

//! `String.prototype.slice` and `substring`.
//!
//! Both cut a window out of the subject; they differ only in how the host
//! arguments map to that window.

use crate::api::propagation::propagate_window;
use crate::api::Propagation;
use crate::engine::manager::TransactionManager;
use crate::engine_core::traits::HostString;
use crate::engine_core::types::TransactionKey;

/// Negative indices count back from the end.
pub fn slice<S: HostString>(
    manager: &mut TransactionManager<S::Weak>,
    transaction: TransactionKey,
    result: &S,
    subject: &S,
    start: i64,
    end: Option<i64>,
) -> Propagation {
    let len = subject.len_utf16();
    let from = relative_index(len, start);
    let to = end.map_or(len, |e| relative_index(len, e));
    if from >= to {
        return Propagation::Untainted;
    }
    propagate_window("slice", manager, transaction, result, subject, from, to)
}

/// Negative indices clamp to zero; bounds swap when `start > end`.
pub fn substring<S: HostString>(
    manager: &mut TransactionManager<S::Weak>,
    transaction: TransactionKey,
    result: &S,
    subject: &S,
    start: i64,
    end: Option<i64>,
) -> Propagation {
    let len = subject.len_utf16();
    let a = clamp_index(len, start);
    let b = end.map_or(len, |e| clamp_index(len, e));
    let (from, to) = if a > b { (b, a) } else { (a, b) };
    if from == to {
        return Propagation::Untainted;
    }
    propagate_window("substring", manager, transaction, result, subject, from, to)
}

fn relative_index(len: usize, index: i64) -> usize {
    if index < 0 {
        len.saturating_sub(usize::try_from(index.unsigned_abs()).unwrap_or(usize::MAX))
    } else {
        clamp_index(len, index)
    }
}

fn clamp_index(len: usize, index: i64) -> usize {
    usize::try_from(index.max(0)).map_or(len, |i| i.min(len))
}
