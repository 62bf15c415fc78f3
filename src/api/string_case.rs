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

use crate::api::{settle, Propagation};
use crate::engine::manager::TransactionManager;
use crate::engine_core::traits::HostString;
use crate::engine_core::types::TransactionKey;

/// `toUpperCase`/`toLowerCase` and friends keep offsets, so the result
/// shares the subject's range vector instead of copying it.
pub fn string_case<S: HostString>(
    manager: &mut TransactionManager<S::Weak>,
    transaction: TransactionKey,
    result: &S,
    subject: &S,
) -> Propagation {
    let Some(tx) = manager.get_mut(transaction) else {
        return Propagation::Untainted;
    };
    let Some(ranges) = tx.ranges_of(subject.identity()) else {
        return Propagation::Untainted;
    };
    if result.identity() == subject.identity() {
        return Propagation::Tainted;
    }
    settle(
        "string_case",
        tx.add_tainted(result.identity(), ranges, result).map(|_| true),
    )
}
