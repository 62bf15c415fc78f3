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

//! Client Propagation Operations.
//!
//! Entry points the host binding calls around instrumented string
//! operations. None of them touches the functional result; they only decide
//! whether taint metadata gets attached to it. Failures inside the engine
//! are reported as [`Propagation::Degraded`] and never abort the host
//! operation.

pub mod array_join;
pub mod concat;
pub mod metrics;
pub mod replace;
pub mod slice;
pub mod string_case;
pub mod taint_methods;
pub mod trim;

mod propagation;

pub use array_join::array_join;
pub use concat::concat;
pub use metrics::{metrics, Metrics, TelemetryVerbosity};
pub use replace::{replace_string_by_string, replace_string_by_string_using_regex, ReplaceMatch};
pub use slice::{slice, substring};
pub use string_case::string_case;
pub use taint_methods::{
    add_secure_marks, get_ranges, is_tainted, new_tainted_object, new_tainted_string,
    remove_transaction, set_max_transactions, RangeView,
};
pub use trim::{trim, trim_end, trim_start};

use tracing::debug;

use crate::engine_core::errors::TaintError;

/// Outcome of one propagation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Propagation {
    /// The result now carries taint.
    Tainted,
    /// Nothing to propagate, or no transaction for the request.
    Untainted,
    /// Taint existed but could not be recorded.
    Degraded(TaintError),
}

impl Propagation {
    pub fn is_tainted(&self) -> bool {
        matches!(self, Propagation::Tainted)
    }
}

pub(crate) fn settle(operation: &'static str, outcome: Result<bool, TaintError>) -> Propagation {
    match outcome {
        Ok(true) => Propagation::Tainted,
        Ok(false) => Propagation::Untainted,
        Err(err) => {
            debug!(
                operation,
                kind = err.kind(),
                exhaustion = err.is_exhaustion(),
                error = %err,
                "Taint not recorded"
            );
            Propagation::Degraded(err)
        }
    }
}
